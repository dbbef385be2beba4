//! Typed update blocks.
//!
//! Each block type knows its entity kind, its name in `blocks.toml` and how
//! to lay out its values in field order.

use codec::{CodecResult, FieldValue};
use repgraph::{EntityKey, SyncEngine, SyncError, SyncResult};
use schema::EntityKind;

/// An update block with a fixed kind and name.
pub trait UpdateBlock {
    const KIND: EntityKind;
    const NAME: &'static str;

    /// Field values in declared order.
    ///
    /// Fails if the block cannot be represented in its declared fields.
    fn values(&self) -> CodecResult<Vec<FieldValue>>;
}

/// Marks `block` dirty on the entity of the block's kind at `index`.
pub fn mark<B: UpdateBlock>(engine: &mut SyncEngine, index: u16, block: &B) -> SyncResult<()> {
    let entity = EntityKey {
        kind: B::KIND,
        index,
    };
    let values = block.values().map_err(|source| SyncError::Block {
        block: B::NAME.to_owned(),
        source,
    })?;
    engine.mark_dirty(entity, B::NAME, &values)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Animation {
    pub id: u16,
    pub delay: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Graphic {
    pub id: u16,
    pub delay: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub damage: u8,
    pub kind: u8,
    pub current: u8,
    pub maximum: u8,
}

impl Hit {
    fn values(self) -> Vec<FieldValue> {
        vec![
            self.damage.into(),
            self.kind.into(),
            self.current.into(),
            self.maximum.into(),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceEntity(pub u16);

/// Player blocks.
pub mod player {
    use super::{Animation, FaceEntity, FieldValue, Graphic, Hit, UpdateBlock};
    use codec::{CodecError, CodecResult};
    use schema::EntityKind;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PlayerAnimation(pub Animation);

    impl UpdateBlock for PlayerAnimation {
        const KIND: EntityKind = EntityKind::Player;
        const NAME: &'static str = "animation";

        fn values(&self) -> CodecResult<Vec<FieldValue>> {
            Ok(vec![self.0.id.into(), self.0.delay.into()])
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PlayerGraphic(pub Graphic);

    impl UpdateBlock for PlayerGraphic {
        const KIND: EntityKind = EntityKind::Player;
        const NAME: &'static str = "graphic";

        fn values(&self) -> CodecResult<Vec<FieldValue>> {
            Ok(vec![self.0.id.into(), self.0.delay.into()])
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Chat {
        pub effects: u16,
        pub rights: u8,
        pub text: String,
    }

    impl UpdateBlock for Chat {
        const KIND: EntityKind = EntityKind::Player;
        const NAME: &'static str = "chat";

        fn values(&self) -> CodecResult<Vec<FieldValue>> {
            Ok(vec![
                self.effects.into(),
                self.rights.into(),
                self.text.as_str().into(),
            ])
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PlayerFaceEntity(pub FaceEntity);

    impl UpdateBlock for PlayerFaceEntity {
        const KIND: EntityKind = EntityKind::Player;
        const NAME: &'static str = "face-entity";

        fn values(&self) -> CodecResult<Vec<FieldValue>> {
            Ok(vec![self.0 .0.into()])
        }
    }

    /// Pre-encoded appearance data, prefixed with its size.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Appearance(pub Vec<u8>);

    impl UpdateBlock for Appearance {
        const KIND: EntityKind = EntityKind::Player;
        const NAME: &'static str = "appearance";

        fn values(&self) -> CodecResult<Vec<FieldValue>> {
            let size = u8::try_from(self.0.len()).map_err(|_| CodecError::ValueOutOfRange {
                field: "size",
                value: i64::try_from(self.0.len()).unwrap_or(i64::MAX),
            })?;
            Ok(vec![size.into(), self.0.as_slice().into()])
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PlayerHit(pub Hit);

    impl UpdateBlock for PlayerHit {
        const KIND: EntityKind = EntityKind::Player;
        const NAME: &'static str = "hit";

        fn values(&self) -> CodecResult<Vec<FieldValue>> {
            Ok(self.0.values())
        }
    }
}

/// NPC blocks.
pub mod npc {
    use super::{Animation, FaceEntity, FieldValue, Graphic, Hit, UpdateBlock};
    use codec::CodecResult;
    use schema::EntityKind;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NpcAnimation(pub Animation);

    impl UpdateBlock for NpcAnimation {
        const KIND: EntityKind = EntityKind::Npc;
        const NAME: &'static str = "animation";

        fn values(&self) -> CodecResult<Vec<FieldValue>> {
            Ok(vec![self.0.id.into(), self.0.delay.into()])
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NpcHit(pub Hit);

    impl UpdateBlock for NpcHit {
        const KIND: EntityKind = EntityKind::Npc;
        const NAME: &'static str = "hit";

        fn values(&self) -> CodecResult<Vec<FieldValue>> {
            Ok(self.0.values())
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NpcGraphic(pub Graphic);

    impl UpdateBlock for NpcGraphic {
        const KIND: EntityKind = EntityKind::Npc;
        const NAME: &'static str = "graphic";

        fn values(&self) -> CodecResult<Vec<FieldValue>> {
            Ok(vec![self.0.id.into(), self.0.delay.into()])
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NpcFaceEntity(pub FaceEntity);

    impl UpdateBlock for NpcFaceEntity {
        const KIND: EntityKind = EntityKind::Npc;
        const NAME: &'static str = "face-entity";

        fn values(&self) -> CodecResult<Vec<FieldValue>> {
            Ok(vec![self.0 .0.into()])
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct ForcedChat(pub String);

    impl UpdateBlock for ForcedChat {
        const KIND: EntityKind = EntityKind::Npc;
        const NAME: &'static str = "forced-chat";

        fn values(&self) -> CodecResult<Vec<FieldValue>> {
            Ok(vec![self.0.as_str().into()])
        }
    }

    /// Switches the NPC to another definition.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Transform(pub u16);

    impl UpdateBlock for Transform {
        const KIND: EntityKind = EntityKind::Npc;
        const NAME: &'static str = "transform";

        fn values(&self) -> CodecResult<Vec<FieldValue>> {
            Ok(vec![self.0.into()])
        }
    }
}
