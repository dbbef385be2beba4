//! Typed outbound messages.

use codec::{IntoMessage, OutboundMessage};

/// Centres the client's map on a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u16,
    pub y: u16,
}

impl IntoMessage for Region {
    fn into_message(self) -> OutboundMessage {
        OutboundMessage::new("region")
            .with("x", self.x)
            .with("y", self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Skill {
    pub id: u8,
    pub experience: u32,
    pub level: u8,
}

impl IntoMessage for Skill {
    fn into_message(self) -> OutboundMessage {
        OutboundMessage::new("skill")
            .with("id", self.id)
            .with("experience", self.experience)
            .with("level", self.level)
    }
}

/// A line in the chat box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameMessage(pub String);

impl IntoMessage for GameMessage {
    fn into_message(self) -> OutboundMessage {
        OutboundMessage::new("game-message").with("text", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceText {
    pub interface: u16,
    pub text: String,
}

impl IntoMessage for InterfaceText {
    fn into_message(self) -> OutboundMessage {
        OutboundMessage::new("interface-text")
            .with("text", self.text)
            .with("interface", self.interface)
    }
}

/// Run energy in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunEnergy(pub u8);

impl IntoMessage for RunEnergy {
    fn into_message(self) -> OutboundMessage {
        OutboundMessage::new("run-energy").with("energy", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Logout;

impl IntoMessage for Logout {
    fn into_message(self) -> OutboundMessage {
        OutboundMessage::new("logout")
    }
}
