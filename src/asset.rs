//! Asset identifiers, load tracking and primitive fallbacks.
//!
//! Loading happens in the host, asynchronously, and may race the first ticks of a round. The
//! simulation never waits on it: every entity kind has a primitive stand-in that is rendered
//! until (or instead of, if loading fails) its model.

use std::collections::HashMap;

use bevy_ecs::resource::Resource;
use tracing::{debug, warn};

use crate::audio::{Sound, Track};
use crate::error::AssetError;

/// Identifiers for every external asset the game can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Asset {
    PlayerModel,
    StrictPursuerModel,
    ErraticPursuerModel,
    TokenModel,
    PortalModel,
    Effect(Sound),
    Music(Track),
}

impl Asset {
    /// The host-side identifier the loader resolves.
    pub fn path(&self) -> String {
        match self {
            Asset::PlayerModel => "models/player.glb".to_string(),
            Asset::StrictPursuerModel => "models/pursuer.glb".to_string(),
            Asset::ErraticPursuerModel => "models/pursuer_erratic.glb".to_string(),
            Asset::TokenModel => "models/token.glb".to_string(),
            Asset::PortalModel => "models/portal.glb".to_string(),
            Asset::Effect(sound) => format!("sound/{}.ogg", <&'static str>::from(sound).to_lowercase()),
            Asset::Music(track) => format!("music/{}.ogg", <&'static str>::from(track).to_lowercase()),
        }
    }
}

/// Something the renderer draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Player,
    StrictPursuer,
    ErraticPursuer,
    Token,
    Portal,
    Wall,
}

impl EntityKind {
    /// The model asset for this kind. Walls are always primitive.
    pub fn model(self) -> Option<Asset> {
        match self {
            EntityKind::Player => Some(Asset::PlayerModel),
            EntityKind::StrictPursuer => Some(Asset::StrictPursuerModel),
            EntityKind::ErraticPursuer => Some(Asset::ErraticPursuerModel),
            EntityKind::Token => Some(Asset::TokenModel),
            EntityKind::Portal => Some(Asset::PortalModel),
            EntityKind::Wall => None,
        }
    }

    /// The placeholder shape used while the model is missing.
    pub fn fallback(self) -> Primitive {
        match self {
            EntityKind::Player => Primitive::Capsule,
            EntityKind::StrictPursuer | EntityKind::ErraticPursuer => Primitive::Cone,
            EntityKind::Token => Primitive::Sphere,
            EntityKind::Portal => Primitive::Ring,
            EntityKind::Wall => Primitive::Box,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Box,
    Capsule,
    Cone,
    Sphere,
    Ring,
}

/// What to draw for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visual {
    Model(Asset),
    Primitive(Primitive),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Pending,
    Ready,
    Failed,
}

/// Load status of every asset the host has reported on.
#[derive(Resource, Debug, Default)]
pub struct AssetRegistry {
    states: HashMap<Asset, LoadState>,
}

impl AssetRegistry {
    pub fn state(&self, asset: Asset) -> LoadState {
        self.states.get(&asset).copied().unwrap_or_default()
    }

    pub fn mark_ready(&mut self, asset: Asset) {
        debug!(?asset, "Asset ready");
        self.states.insert(asset, LoadState::Ready);
    }

    /// Records a failed load. The entity keeps its primitive fallback for good.
    pub fn mark_failed(&mut self, asset: Asset, error: AssetError) {
        warn!(?asset, path = %asset.path(), "Asset unavailable, using fallback: {error}");
        self.states.insert(asset, LoadState::Failed);
    }

    pub fn visual_for(&self, kind: EntityKind) -> Visual {
        match kind.model() {
            Some(asset) if self.state(asset) == LoadState::Ready => Visual::Model(asset),
            _ => Visual::Primitive(kind.fallback()),
        }
    }
}
