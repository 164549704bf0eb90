use std::fs;

use skywars_api::{colorize, Form, FormElement, FormResponse, FormValue, StoreError};

use super::*;

/// Action buttons of the per-arena settings menu, in order.
const ARENA_ACTIONS: [&str; 7] = [
    "Setup Arena Spawn",
    "Setup Spectator Spawn",
    "Setup Arena Behaviour",
    "Set Join Sign Behaviour",
    "Set Join Sign Location",
    "Edit this world",
    "&cDelete this arena",
];

/// What an outstanding form is asking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelForm {
    Setup { worlds: Vec<String> },
    SpawnOffer { arena: String },
    ArenaList { arenas: Vec<String> },
    ArenaActions { arena: String },
    Behaviour { arena: String },
    SignLines { arena: String },
    DeleteConfirm { arena: String },
    Stats,
}

/// The form a player was last shown. Only its id is answered.
#[derive(Debug)]
pub(super) struct OpenForm {
    id: u32,
    form: Form,
    purpose: PanelForm,
}

impl<J: ArchiveScheduler> ArenaEditCoordinator<J> {
    fn present(&mut self, host: &mut dyn ArenaHost, player: &str, form: Form, purpose: PanelForm) -> u32 {
        self.discard_form(player);
        let id = self.next_form_id;
        self.next_form_id = self.next_form_id.checked_add(1).unwrap_or(1);
        host.show_form(player, id, &form);
        self.forms
            .insert(PlayerKey::new(player), OpenForm { id, form, purpose });
        id
    }

    /// Forget a player's open form. An unanswered spawn offer counts as
    /// "setup later".
    pub(super) fn discard_form(&mut self, player: &str) {
        let Some(open) = self.forms.remove(&PlayerKey::new(player)) else {
            return;
        };
        if let PanelForm::SpawnOffer { arena } = open.purpose {
            self.settle_archived(&arena);
        }
    }

    fn settle_archived(&mut self, arena: &str) {
        if self.phase(arena) == Some(ArenaPhase::Archived) {
            self.phases.insert(arena.to_string(), ArenaPhase::Ready);
        }
    }

    /// Purpose of the form `player` is looking at, if any.
    pub fn open_form(&self, player: &str) -> Option<(u32, &PanelForm)> {
        self.forms
            .get(&PlayerKey::new(player))
            .map(|open| (open.id, &open.purpose))
    }

    /// World folders that can become arenas: not the lobby, not hidden and
    /// not claimed by any arena. Sorted by name.
    pub fn free_worlds(&self) -> Result<Vec<String>, SetupError> {
        let entries = match fs::read_dir(&self.settings.worlds_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::from(e).into()),
        };

        let claimed: Vec<String> = self
            .stores
            .arenas
            .list()?
            .into_iter()
            .map(|a| a.world)
            .collect();

        let mut worlds = Vec::new();
        for entry in entries {
            let entry = entry.map_err(StoreError::from)?;
            if !entry.path().is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') || name == self.settings.lobby_world || claimed.contains(&name) {
                continue;
            }
            worlds.push(name);
        }
        worlds.sort();
        Ok(worlds)
    }

    // --- Entry points ---

    /// Show the new-arena form, or the no-world message if nothing is free.
    pub fn open_setup(&mut self, host: &mut dyn ArenaHost, player: &str) -> Result<(), SetupError> {
        let worlds = self.free_worlds()?;
        if worlds.is_empty() {
            host.send_message(player, &self.messages.render(&self.messages.no_world));
            return Ok(());
        }

        let form = Form::custom(
            colorize("&5SkyWars Setup."),
            vec![
                FormElement::input(colorize("&6The name of your Arena."), "Donkey Island", ""),
                FormElement::dropdown(colorize("&6Select your Arena level."), worlds.clone()),
                FormElement::slider(colorize("&eMaximum players"), 4, 40, 4),
                FormElement::slider(colorize("&eMinimum players"), 2, 40, 2),
                FormElement::toggle(colorize("&7Spectator mode"), true),
                FormElement::toggle(colorize("&7Start on full"), true),
            ],
        );
        self.present(host, player, form, PanelForm::Setup { worlds });
        Ok(())
    }

    /// Show the arena picker that leads to the per-arena settings.
    pub fn open_settings(&mut self, host: &mut dyn ArenaHost, player: &str) -> Result<(), SetupError> {
        let arenas = self.arena_names();
        let content = if arenas.is_empty() { "No arenas yet." } else { "" };
        let form = Form::menu(colorize("&aChoose your arena first."), content, arenas.clone());
        self.present(host, player, form, PanelForm::ArenaList { arenas });
        Ok(())
    }

    pub fn show_stats(&mut self, host: &mut dyn ArenaHost, player: &str) -> Result<(), SetupError> {
        let record = self.stores.stats.player_data(player)?;
        let form = Form::custom(
            colorize(&format!("&a{}'s stats", record.player)),
            vec![
                FormElement::label(colorize(&format!("&6Name: &f{}", record.player))),
                FormElement::label(colorize(&format!("&6Kills: &f{}", record.kills))),
                FormElement::label(colorize(&format!("&6Deaths: &f{}", record.deaths))),
                FormElement::label(colorize(&format!("&6Wins: &f{}", record.wins))),
                FormElement::label(colorize(&format!("&6Lost: &f{}", record.losses))),
            ],
        );
        self.present(host, player, form, PanelForm::Stats);
        Ok(())
    }

    /// Offer spawn capture right after a new arena is archived.
    pub(super) fn offer_spawn_setup(&mut self, host: &mut dyn ArenaHost, player: &str, arena: &str) {
        let form = Form::modal(
            "",
            colorize("&aYou may need to setup arena's spawn position so system could enable the arena much faster."),
            "Setup arena spawn.",
            colorize("&cSetup later."),
        );
        self.present(
            host,
            player,
            form,
            PanelForm::SpawnOffer {
                arena: arena.to_string(),
            },
        );
    }

    // --- Responses ---

    /// Route a form answer. `data` is the raw response JSON; `None` means
    /// the form was closed. Answers to anything but the player's latest
    /// form are dropped.
    pub fn on_form_response(
        &mut self,
        host: &mut dyn ArenaHost,
        player: &str,
        form_id: u32,
        data: Option<&str>,
    ) -> Result<(), SetupError> {
        let key = PlayerKey::new(player);
        match self.forms.get(&key) {
            Some(open) if open.id == form_id => {}
            _ => {
                debug!("Dropping response of {player} to stale form {form_id}");
                return Ok(());
            }
        }
        let Some(open) = self.forms.remove(&key) else {
            return Ok(());
        };

        let response = match open.form.parse_response(data) {
            Ok(response) => response,
            Err(e) => {
                warn!("Malformed response from {player} to form {form_id}: {e}");
                host.send_message(player, &self.messages.render(&self.messages.panel_low_arguments));
                return Ok(());
            }
        };

        match (open.purpose, response) {
            (PanelForm::SpawnOffer { arena }, FormResponse::Modal(true)) => {
                if let Err(e) = self.begin_spawn_capture(player, &arena) {
                    self.settle_archived(&arena);
                    return Err(e);
                }
            }
            (PanelForm::SpawnOffer { arena }, _) => {
                self.settle_archived(&arena);
                self.drafts.remove(&key);
            }
            (PanelForm::Stats, _) => {}
            (PanelForm::DeleteConfirm { arena }, FormResponse::Modal(true)) => {
                self.delete_arena(&arena)?;
                host.send_message(player, &self.messages.arena_delete(&arena));
            }
            (PanelForm::DeleteConfirm { .. }, _) => {}
            (_, FormResponse::Closed) => {
                host.send_message(player, &self.messages.render(&self.messages.panel_cancelled));
            }
            (PanelForm::Setup { worlds }, FormResponse::Custom(values)) => {
                self.submit_setup(host, player, &worlds, &values)?;
            }
            (PanelForm::ArenaList { arenas }, FormResponse::Menu(index)) => {
                if let Some(arena) = arenas.get(index) {
                    self.open_arena_actions(host, player, arena)?;
                }
            }
            (PanelForm::ArenaActions { arena }, FormResponse::Menu(index)) => {
                self.run_arena_action(host, player, &arena, index)?;
            }
            (PanelForm::Behaviour { arena }, FormResponse::Custom(values)) => {
                self.apply_behaviour(host, player, &arena, &values)?;
            }
            (PanelForm::SignLines { arena }, FormResponse::Custom(values)) => {
                self.apply_sign_lines(host, player, &arena, &values)?;
            }
            (purpose, response) => {
                warn!("Unexpected response {response:?} to {purpose:?} from {player}");
            }
        }
        Ok(())
    }

    fn submit_setup(
        &mut self,
        host: &mut dyn ArenaHost,
        player: &str,
        worlds: &[String],
        values: &[FormValue],
    ) -> Result<(), SetupError> {
        let name = values
            .first()
            .and_then(FormValue::as_text)
            .map(str::trim)
            .unwrap_or_default();
        let world = values
            .get(1)
            .and_then(FormValue::as_choice)
            .and_then(|i| worlds.get(i));
        let valid_name = !name.is_empty() && !name.starts_with('.') && !name.contains(['/', '\\']);
        let Some(world) = world.filter(|_| valid_name) else {
            host.send_message(player, &self.messages.render(&self.messages.panel_low_arguments));
            return Ok(());
        };

        let count = |i: usize, default: u32| values.get(i).and_then(FormValue::as_count).unwrap_or(default);
        let flag = |i: usize| values.get(i).and_then(FormValue::as_flag).unwrap_or(true);
        let mut draft = PendingEdit::new(name, world).with_players(count(2, 4), count(3, 2));
        draft.spectator_mode = flag(4);
        draft.start_on_full = flag(5);

        self.create_arena(host, player, draft)?;
        Ok(())
    }

    fn open_arena_actions(&mut self, host: &mut dyn ArenaHost, player: &str, arena: &str) -> Result<(), SetupError> {
        if !self.phases.contains_key(arena) {
            return Err(SetupError::UnknownArena(arena.to_string()));
        }
        let form = Form::menu(
            format!("Setup for arena {arena}"),
            "",
            ARENA_ACTIONS.iter().map(|a| colorize(a)),
        );
        self.present(
            host,
            player,
            form,
            PanelForm::ArenaActions {
                arena: arena.to_string(),
            },
        );
        Ok(())
    }

    fn run_arena_action(
        &mut self,
        host: &mut dyn ArenaHost,
        player: &str,
        arena: &str,
        index: usize,
    ) -> Result<(), SetupError> {
        match index {
            0 => {
                self.begin_spawn_capture(player, arena)?;
            }
            1 => {
                self.begin_spectator_capture(player, arena)?;
            }
            2 => self.open_behaviour(host, player, arena)?,
            3 => self.open_sign_lines(host, player, arena)?,
            4 => self.begin_sign_capture(host, player, arena)?,
            5 => {
                self.begin_edit(player, arena)?;
            }
            6 => {
                let form = Form::modal(
                    "",
                    colorize("&cAre you sure to perform this action? Deleting an arena will only delete your arena setup but will not affect your world."),
                    colorize("&cDelete"),
                    "Cancel",
                );
                self.present(
                    host,
                    player,
                    form,
                    PanelForm::DeleteConfirm {
                        arena: arena.to_string(),
                    },
                );
            }
            _ => warn!("Unknown arena action {index} from {player}"),
        }
        Ok(())
    }

    fn open_behaviour(&mut self, host: &mut dyn ArenaHost, player: &str, name: &str) -> Result<(), SetupError> {
        let arena = self.stored(name)?;
        let form = Form::custom(
            "Arena settings.",
            vec![
                FormElement::toggle(colorize("&eEnable the arena?"), arena.enabled),
                FormElement::slider(colorize("&eSet Grace Timer"), 0, 30, arena.grace_timer),
                FormElement::toggle(colorize("&eEnable Spectator Mode?"), arena.spectator_mode),
                FormElement::slider(colorize("&eMaximum players to be in arena"), 0, 50, arena.max_players),
                FormElement::slider(colorize("&eMinimum players to be in arena"), 0, 50, arena.min_players),
                FormElement::toggle(colorize("&eStart when full"), arena.start_on_full),
            ],
        );
        self.present(
            host,
            player,
            form,
            PanelForm::Behaviour {
                arena: name.to_string(),
            },
        );
        Ok(())
    }

    fn apply_behaviour(
        &mut self,
        host: &mut dyn ArenaHost,
        player: &str,
        name: &str,
        values: &[FormValue],
    ) -> Result<(), SetupError> {
        let mut arena = self.stored(name)?;
        let flag = |i: usize, current: bool| values.get(i).and_then(FormValue::as_flag).unwrap_or(current);
        let count = |i: usize, current: u32| values.get(i).and_then(FormValue::as_count).unwrap_or(current);

        arena.enabled = flag(0, arena.enabled);
        arena.grace_timer = count(1, arena.grace_timer);
        arena.spectator_mode = flag(2, arena.spectator_mode);
        let (max, min) = (count(3, arena.max_players), count(4, arena.min_players));
        arena.set_player_counts(max, min);
        arena.start_on_full = flag(5, arena.start_on_full);

        self.stores.arenas.put(&arena)?;
        host.send_message(player, &self.messages.arena_updated(name));
        Ok(())
    }

    fn open_sign_lines(&mut self, host: &mut dyn ArenaHost, player: &str, name: &str) -> Result<(), SetupError> {
        let arena = self.stored(name)?;
        let mut elements = vec![
            FormElement::label(colorize(
                "&aWelcome to sign Behaviour Setup. First before you doing anything, you may need to know these",
            )),
            FormElement::label(colorize(
                "&eStatus placeholders\n%alive = amount of in-game players\n%dead = amount of dead players\n%status = game status\n%world = world name of arena\n%max = max players per arena",
            )),
        ];
        for (i, line) in arena.sign_lines.iter().enumerate() {
            elements.push(FormElement::input(
                colorize(&format!("&aSign Placeholder {}", i + 1)),
                "Sign Text",
                line.clone(),
            ));
        }
        let form = Form::custom(colorize("&eForm Behaviour Setup"), elements);
        self.present(
            host,
            player,
            form,
            PanelForm::SignLines {
                arena: name.to_string(),
            },
        );
        Ok(())
    }

    fn apply_sign_lines(
        &mut self,
        host: &mut dyn ArenaHost,
        player: &str,
        name: &str,
        values: &[FormValue],
    ) -> Result<(), SetupError> {
        let mut arena = self.stored(name)?;
        let texts: Vec<&str> = values.iter().filter_map(FormValue::as_text).collect();
        for (line, text) in arena.sign_lines.iter_mut().zip(texts) {
            *line = text.to_string();
        }
        self.stores.arenas.put(&arena)?;
        host.send_message(player, &self.messages.sign_updated(name));
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
