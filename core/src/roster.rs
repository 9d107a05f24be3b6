//! Actor and ability lookup tables for one analysis run.
//!
//! A [`Roster`] is built once from the report's reference data and only read
//! afterwards; each run owns its own roster.

use hashbrown::{HashMap, HashSet};
use serde::Serialize;

use crate::combat_log::Event;
use crate::game_data::DamageKind;
use crate::report::{MasterData, RawAbility, RawActor};
use crate::timeline::AnalysisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActorCategory {
    Player,
    /// Player-owned pet, summon or limit break entity
    Pet,
    Hostile,
    Environment,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Actor {
    pub id: i64,
    pub name: String,
    pub category: ActorCategory,
    pub owner_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ability {
    pub id: i64,
    pub name: String,
    pub damage_kind: Option<DamageKind>,
}

/// Where a resolved label came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSource {
    /// Carried on the event itself
    Inline,
    /// Looked up in the reference table
    Table,
    /// Neither was available
    Placeholder,
}

/// Sources tried, in order, when labelling an ability.
const ABILITY_NAME_ORDER: [NameSource; 3] =
    [NameSource::Inline, NameSource::Table, NameSource::Placeholder];

pub const ENVIRONMENT_NAME: &str = "Environment";

#[derive(Debug, Clone, Default)]
pub struct Roster {
    actors: HashMap<i64, Actor>,
    abilities: HashMap<i64, Ability>,
    player_ids: HashSet<i64>,
    pet_ids: HashSet<i64>,
    ability_table_missing: bool,
}

impl Roster {
    /// Build from report reference data.
    ///
    /// A missing actor table is fatal; a missing ability table only degrades
    /// labels to placeholders.
    pub fn from_master_data(master: Option<&MasterData>) -> Result<Self, AnalysisError> {
        let actors = master
            .and_then(|m| m.actors.as_deref())
            .ok_or(AnalysisError::MissingReferenceData { table: "actors" })?;
        let abilities = master.and_then(|m| m.abilities.as_deref());
        if abilities.is_none() {
            tracing::warn!("Ability table missing, abilities will be labelled by id");
        }
        Ok(Self::build(actors, abilities))
    }

    pub fn build(actors: &[RawActor], abilities: Option<&[RawAbility]>) -> Self {
        let player_ids: HashSet<i64> = actors
            .iter()
            .filter(|a| a.kind == "Player")
            .map(|a| a.id)
            .collect();

        let pet_ids: HashSet<i64> = actors
            .iter()
            .filter(|a| {
                let pet_type = a.kind == "Pet" || a.kind == "LimitBreak";
                let owned_by_player = a.pet_owner.is_some_and(|owner| player_ids.contains(&owner));
                pet_type || owned_by_player
            })
            .map(|a| a.id)
            .collect();

        let actors = actors
            .iter()
            .map(|a| {
                let category = if player_ids.contains(&a.id) {
                    ActorCategory::Player
                } else if pet_ids.contains(&a.id) {
                    ActorCategory::Pet
                } else if a.kind == "Environment" {
                    ActorCategory::Environment
                } else {
                    ActorCategory::Hostile
                };
                let actor = Actor {
                    id: a.id,
                    name: a.name.clone(),
                    category,
                    owner_id: if category == ActorCategory::Pet {
                        a.pet_owner
                    } else {
                        None
                    },
                };
                (a.id, actor)
            })
            .collect();

        let ability_table_missing = abilities.is_none();
        let abilities = abilities
            .unwrap_or_default()
            .iter()
            .map(|ab| {
                let ability = Ability {
                    id: ab.game_id,
                    name: ab.name.clone(),
                    damage_kind: ab
                        .kind
                        .as_ref()
                        .and_then(|k| k.as_code())
                        .map(DamageKind::from_code),
                };
                (ab.game_id, ability)
            })
            .collect();

        Self {
            actors,
            abilities,
            player_ids,
            pet_ids,
            ability_table_missing,
        }
    }

    pub fn actor(&self, id: i64) -> Option<&Actor> {
        self.actors.get(&id)
    }

    pub fn ability(&self, id: i64) -> Option<&Ability> {
        self.abilities.get(&id)
    }

    pub fn ability_table_missing(&self) -> bool {
        self.ability_table_missing
    }

    pub fn is_player(&self, id: i64) -> bool {
        self.player_ids.contains(&id)
    }

    pub fn is_player_pet(&self, id: i64) -> bool {
        self.pet_ids.contains(&id)
    }

    /// Source name, `"Environment"` for absent or unknown sources.
    pub fn source_name(&self, source_id: Option<i64>) -> (String, bool) {
        match source_id.and_then(|id| self.actor(id)) {
            Some(actor) => (actor.name.clone(), true),
            None => (ENVIRONMENT_NAME.to_string(), source_id.is_none()),
        }
    }

    /// Ability label following [`ABILITY_NAME_ORDER`].
    pub fn ability_name(&self, event: &Event) -> (String, NameSource) {
        ABILITY_NAME_ORDER
            .iter()
            .find_map(|source| self.ability_name_from(*source, event).map(|n| (n, *source)))
            .unwrap_or_else(|| (unknown_ability(event.ability_id), NameSource::Placeholder))
    }

    fn ability_name_from(&self, source: NameSource, event: &Event) -> Option<String> {
        match source {
            NameSource::Inline => event.ability_name.clone().filter(|n| !n.is_empty()),
            NameSource::Table => self
                .ability(event.ability_id)
                .map(|a| a.name.clone())
                .filter(|n| !n.is_empty()),
            NameSource::Placeholder => Some(unknown_ability(event.ability_id)),
        }
    }

    /// Name used for filtering: inline name, then table name.
    pub fn known_ability_name<'a>(&'a self, event: &'a Event) -> Option<&'a str> {
        event
            .ability_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or_else(|| self.ability(event.ability_id).map(|a| a.name.as_str()))
    }

    /// Damage kind: inline code first, then the ability table.
    pub fn damage_kind(&self, event: &Event) -> Option<DamageKind> {
        event
            .ability_type
            .map(DamageKind::from_code)
            .or_else(|| self.ability(event.ability_id).and_then(|a| a.damage_kind))
    }
}

fn unknown_ability(id: i64) -> String {
    format!("Unknown ({id})")
}
