/// Trigger-zone adapter
///
/// Bridges the physics layer's opaque enter/exit notifications onto the
/// event bus. Collision detection itself lives outside this crate; a zone
/// only decides whether the body matters (the player) and which event kind
/// to raise.
use super::bus::EventBus;
use super::events::AudioEvent;

/// Tag identifying what kind of body touched a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyTag {
    Player,
    Npc,
    Projectile,
    Other,
}

/// A 3D zone that raises sting events when the player crosses its boundary.
///
/// Any number of zones can share one bus; each is an independent producer
/// of the same logical `EnterSting`/`ExitSting` signals.
pub struct StingTriggerZone {
    bus: EventBus,
    name: String,
}

impl StingTriggerZone {
    pub fn new(bus: EventBus, name: impl Into<String>) -> Self {
        Self {
            bus,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// A body entered the zone volume
    pub fn body_entered(&self, body: BodyTag) {
        if body == BodyTag::Player {
            tracing::debug!("Player entered sting zone '{}'", self.name);
            self.bus.publish(AudioEvent::EnterSting);
        }
    }

    /// A body left the zone volume
    pub fn body_exited(&self, body: BodyTag) {
        if body == BodyTag::Player {
            tracing::debug!("Player left sting zone '{}'", self.name);
            self.bus.publish(AudioEvent::ExitSting);
        }
    }
}
