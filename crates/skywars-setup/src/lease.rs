//! Loaning the capture tool to a player and giving their slot back.

use std::collections::HashMap;

use skywars_api::{ArenaHost, GameMode, ItemStack, PlayerKey};
use tracing::debug;

/// Hotbar slot the capture tool is placed in.
pub const TOOL_SLOT: u8 = 0;

/// What the player held before the tool was loaned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolLoanRecord {
    pub held_slot: u8,
    pub slot_item: ItemStack,
}

#[derive(Debug)]
pub struct ToolLease {
    tool: ItemStack,
    loans: HashMap<PlayerKey, ToolLoanRecord>,
}

impl ToolLease {
    pub fn new(tool: ItemStack) -> Self {
        Self {
            tool,
            loans: HashMap::new(),
        }
    }

    pub fn tool(&self) -> &ItemStack {
        &self.tool
    }

    /// Whether `item` is the capture tool.
    pub fn is_tool(&self, item: &ItemStack) -> bool {
        !item.is_empty() && item.same_item(&self.tool)
    }

    pub fn is_loaned(&self, player: &str) -> bool {
        self.loans.contains_key(&PlayerKey::new(player))
    }

    /// Save the player's selection and slot 0, switch them to creative and
    /// hand them the tool.
    ///
    /// A second acquire keeps the first record so the item that goes back is
    /// always the one the player had before any loan.
    pub fn acquire(&mut self, host: &mut dyn ArenaHost, player: &str) {
        let key = PlayerKey::new(player);
        if !self.loans.contains_key(&key) {
            let record = ToolLoanRecord {
                held_slot: host.held_slot(player).unwrap_or(TOOL_SLOT),
                slot_item: host
                    .hotbar_item(player, TOOL_SLOT)
                    .unwrap_or_else(ItemStack::empty),
            };
            debug!("Loaning capture tool to {key} (was holding slot {})", record.held_slot);
            self.loans.insert(key, record);
        }

        host.set_gamemode(player, GameMode::Creative);
        host.set_held_slot(player, TOOL_SLOT);
        host.set_hotbar_item(player, TOOL_SLOT, self.tool.clone());
    }

    /// Put back the saved slot 0 item and selection. Returns false when
    /// there was nothing to restore.
    pub fn release(&mut self, host: &mut dyn ArenaHost, player: &str) -> bool {
        let Some(record) = self.loans.remove(&PlayerKey::new(player)) else {
            return false;
        };
        host.set_hotbar_item(player, TOOL_SLOT, record.slot_item);
        host.set_held_slot(player, record.held_slot);
        true
    }

    pub fn len(&self) -> usize {
        self.loans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loans.is_empty()
    }
}
