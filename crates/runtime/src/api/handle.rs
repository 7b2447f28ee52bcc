//! Cloneable façade for issuing commands to the session worker.
//!
//! [`SessionHandle`] hides channel plumbing and offers async helpers
//! for every inbound intent the table UI or GM layer can send, plus
//! event subscription per topic.
use tokio::sync::{broadcast, mpsc, oneshot};

use encounter_core::{
    ActionId, AdvanceReport, DamageReport, EntryId, InitiativeSeed, MineBlast, MineId, MineSpec,
    Position, RollId, SessionState, StormStrikeReport, StormTick, TokenId, TokenSpec,
};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to interact with one session.
#[derive(Clone)]
pub struct SessionHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl SessionHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T>>) -> Command,
    ) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Start combat from roster seeds; highest initiative acts first.
    pub async fn start_combat(&self, seeds: Vec<InitiativeSeed>) -> Result<()> {
        self.request(|reply| Command::StartCombat { seeds, reply })
            .await
    }

    /// End combat and clear all in-flight continuations.
    pub async fn end_combat(&self) -> Result<()> {
        self.request(|reply| Command::EndCombat { reply }).await
    }

    /// Advance to the next turn manually.
    pub async fn advance_turn(&self) -> Result<AdvanceReport> {
        self.request(|reply| Command::AdvanceTurn { reply }).await
    }

    /// Replace the initiative order with a manual arrangement.
    pub async fn reorder_initiative(&self, order: Vec<EntryId>) -> Result<()> {
        self.request(|reply| Command::ReorderInitiative { order, reply })
            .await
    }

    /// Move a token, validated against speed, bounds, and occupancy.
    pub async fn request_move(&self, token: TokenId, destination: Position) -> Result<()> {
        self.request(|reply| Command::RequestMove {
            token,
            destination,
            reply,
        })
        .await
    }

    pub async fn spawn_token(&self, spec: TokenSpec) -> Result<TokenId> {
        self.request(|reply| Command::SpawnToken { spec, reply })
            .await
    }

    pub async fn remove_token(&self, token: TokenId) -> Result<()> {
        self.request(|reply| Command::RemoveToken { token, reply })
            .await
    }

    pub async fn apply_damage(&self, token: TokenId, amount: u32) -> Result<DamageReport> {
        self.request(|reply| Command::ApplyDamage {
            token,
            amount,
            reply,
        })
        .await
    }

    pub async fn heal(&self, token: TokenId, amount: u32) -> Result<u32> {
        self.request(|reply| Command::Heal {
            token,
            amount,
            reply,
        })
        .await
    }

    /// Arm a mine on the map.
    pub async fn place_mine(&self, spec: MineSpec) -> Result<MineId> {
        self.request(|reply| Command::PlaceMine { spec, reply })
            .await
    }

    /// Reveal a detected mine to the table.
    pub async fn reveal_mine(&self, mine: MineId) -> Result<()> {
        self.request(|reply| Command::RevealMine { mine, reply })
            .await
    }

    /// Detonate a mine under the given token. Idempotent per mine.
    pub async fn trigger_mine(&self, mine: MineId, token: TokenId) -> Result<MineBlast> {
        self.request(|reply| Command::TriggerMine { mine, token, reply })
            .await
    }

    pub async fn activate_storm(&self, total_rounds: u32, stacks: u32) -> Result<()> {
        self.request(|reply| Command::ActivateStorm {
            total_rounds,
            stacks,
            reply,
        })
        .await
    }

    /// Advance the storm one tick, parking a strike for external damage
    /// confirmation.
    pub async fn storm_tick(&self) -> Result<StormTick> {
        self.request(|reply| Command::StormTick { reply }).await
    }

    /// Supply damage for an outstanding storm strike.
    pub async fn resolve_storm_roll(&self, roll: RollId, damage: u32) -> Result<StormStrikeReport> {
        self.request(|reply| Command::ResolveStormRoll {
            roll,
            damage,
            reply,
        })
        .await
    }

    /// Supply the externally confirmed result of a pending action.
    pub async fn resolve_action(&self, action: ActionId, hit: bool, damage: u32) -> Result<()> {
        self.request(|reply| Command::ResolveAction {
            action,
            hit,
            damage,
            reply,
        })
        .await
    }

    /// Run the enemy decision pipeline for the current initiative slot.
    pub async fn run_enemy_turn(&self, entry: EntryId) -> Result<()> {
        self.request(|reply| Command::RunEnemyTurn { entry, reply })
            .await
    }

    /// Query the current session document (read-only snapshot).
    pub async fn query_session(&self) -> Result<SessionState> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(Command::QuerySession { reply: reply_tx })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Turn` - Turn cycle changes
    /// - `Topic::Combat` - Roster and pending-action changes
    /// - `Topic::Hazard` - Mine and storm activity
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
