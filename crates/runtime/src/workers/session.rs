//! Session worker that owns the authoritative session document.
//!
//! One worker task per session is the single logical writer: every
//! mutation arrives as a [`Command`], executes against a working clone
//! of the state, and commits plus persists only on success, so a failed
//! operation never leaves a partial write behind. Enemy turns run
//! through the intent provider and finish via an abortable preview
//! timer, keeping the guard flag honest even when change notifications
//! arrive in bursts.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use encounter_core::{
    ActionId, AdvanceReport, CombatEngine, CoreEnv, DamageReport, Dice, EntryId, EntryKind, Faction,
    InitiativeSeed, MineBlast, MineId, MineSpec, PcgDice, PendingAction, Position, RollId,
    SessionState, StormStrikeReport, StormTick, TokenId, TokenSpec, TurnError, mix_seed,
};
use encounter_content::ContentArchetypes;

use crate::api::{IntentProvider, Result, RuntimeError};
use crate::events::{CombatEvent, Event, EventBus, HazardEvent, TurnEvent};
use crate::providers::ai::{ActionIntent, AttackSpec};
use crate::repository::SessionRepository;
use crate::runtime::RuntimeConfig;

/// Commands that can be sent to the session worker.
pub enum Command {
    StartCombat {
        seeds: Vec<InitiativeSeed>,
        reply: oneshot::Sender<Result<()>>,
    },
    EndCombat {
        reply: oneshot::Sender<Result<()>>,
    },
    AdvanceTurn {
        reply: oneshot::Sender<Result<AdvanceReport>>,
    },
    ReorderInitiative {
        order: Vec<EntryId>,
        reply: oneshot::Sender<Result<()>>,
    },
    RequestMove {
        token: TokenId,
        destination: Position,
        reply: oneshot::Sender<Result<()>>,
    },
    SpawnToken {
        spec: TokenSpec,
        reply: oneshot::Sender<Result<TokenId>>,
    },
    RemoveToken {
        token: TokenId,
        reply: oneshot::Sender<Result<()>>,
    },
    ApplyDamage {
        token: TokenId,
        amount: u32,
        reply: oneshot::Sender<Result<DamageReport>>,
    },
    Heal {
        token: TokenId,
        amount: u32,
        reply: oneshot::Sender<Result<u32>>,
    },
    PlaceMine {
        spec: MineSpec,
        reply: oneshot::Sender<Result<MineId>>,
    },
    RevealMine {
        mine: MineId,
        reply: oneshot::Sender<Result<()>>,
    },
    TriggerMine {
        mine: MineId,
        token: TokenId,
        reply: oneshot::Sender<Result<MineBlast>>,
    },
    ActivateStorm {
        total_rounds: u32,
        stacks: u32,
        reply: oneshot::Sender<Result<()>>,
    },
    StormTick {
        reply: oneshot::Sender<Result<StormTick>>,
    },
    ResolveStormRoll {
        roll: RollId,
        damage: u32,
        reply: oneshot::Sender<Result<StormStrikeReport>>,
    },
    ResolveAction {
        action: ActionId,
        hit: bool,
        damage: u32,
        reply: oneshot::Sender<Result<()>>,
    },
    RunEnemyTurn {
        entry: EntryId,
        reply: oneshot::Sender<Result<()>>,
    },
    QuerySession {
        reply: oneshot::Sender<SessionState>,
    },
}

/// Background task that processes session commands.
pub struct SessionWorker {
    session_id: String,
    state: SessionState,
    repository: Arc<dyn SessionRepository>,
    provider: Arc<dyn IntentProvider>,
    archetypes: ContentArchetypes,
    dice: PcgDice,
    config: RuntimeConfig,
    command_rx: mpsc::Receiver<Command>,
    finish_tx: mpsc::Sender<EntryId>,
    finish_rx: mpsc::Receiver<EntryId>,
    events: EventBus,
    /// Guard against re-entrant enemy turn execution while a preview
    /// timer is outstanding.
    enemy_turn_active: bool,
    pending_advance: Option<JoinHandle<()>>,
}

impl SessionWorker {
    pub fn new(
        session_id: String,
        state: SessionState,
        repository: Arc<dyn SessionRepository>,
        provider: Arc<dyn IntentProvider>,
        config: RuntimeConfig,
        command_rx: mpsc::Receiver<Command>,
        events: EventBus,
    ) -> Self {
        let (finish_tx, finish_rx) = mpsc::channel(4);
        Self {
            session_id,
            state,
            repository,
            provider,
            archetypes: ContentArchetypes,
            dice: PcgDice,
            config,
            command_rx,
            finish_tx,
            finish_rx,
            events,
            enemy_turn_active: false,
            pending_advance: None,
        }
    }

    /// Main worker loop. Ends when every command sender is gone.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break,
                },
                Some(entry) = self.finish_rx.recv() => {
                    self.finish_enemy_turn(entry);
                }
            }
        }

        if let Some(timer) = self.pending_advance.take() {
            timer.abort();
        }
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::StartCombat { seeds, reply } => {
                let _ = reply.send(self.start_combat(seeds));
            }
            Command::EndCombat { reply } => {
                let _ = reply.send(self.end_combat());
            }
            Command::AdvanceTurn { reply } => {
                let _ = reply.send(self.advance_turn());
            }
            Command::ReorderInitiative { order, reply } => {
                let _ = reply.send(self.reorder(order));
            }
            Command::RequestMove {
                token,
                destination,
                reply,
            } => {
                let _ = reply.send(self.request_move(token, destination));
            }
            Command::SpawnToken { spec, reply } => {
                let _ = reply.send(self.spawn_token(spec));
            }
            Command::RemoveToken { token, reply } => {
                let _ = reply.send(self.remove_token(token));
            }
            Command::ApplyDamage {
                token,
                amount,
                reply,
            } => {
                let _ = reply.send(self.apply_damage(token, amount));
            }
            Command::Heal {
                token,
                amount,
                reply,
            } => {
                let _ = reply.send(self.heal(token, amount));
            }
            Command::PlaceMine { spec, reply } => {
                let _ = reply.send(self.place_mine(spec));
            }
            Command::RevealMine { mine, reply } => {
                let _ = reply.send(self.reveal_mine(mine));
            }
            Command::TriggerMine { mine, token, reply } => {
                let _ = reply.send(self.trigger_mine(mine, token));
            }
            Command::ActivateStorm {
                total_rounds,
                stacks,
                reply,
            } => {
                let _ = reply.send(self.activate_storm(total_rounds, stacks));
            }
            Command::StormTick { reply } => {
                let _ = reply.send(self.storm_tick());
            }
            Command::ResolveStormRoll {
                roll,
                damage,
                reply,
            } => {
                let _ = reply.send(self.resolve_storm_roll(roll, damage));
            }
            Command::ResolveAction {
                action,
                hit,
                damage,
                reply,
            } => {
                let _ = reply.send(self.resolve_action(action, hit, damage));
            }
            Command::RunEnemyTurn { entry, reply } => {
                let _ = reply.send(self.run_enemy_turn(entry).await);
            }
            Command::QuerySession { reply } => {
                let _ = reply.send(self.state.clone());
            }
        }
    }

    /// Replace the authoritative state and persist it. Persistence
    /// failures are logged, not fatal: the in-memory session stays
    /// consistent and the next successful save catches up.
    fn commit(&mut self, working: SessionState) {
        self.state = working;
        if let Err(err) = self.repository.save(&self.session_id, &self.state) {
            error!(session = %self.session_id, error = %err, "failed to persist session document");
        }
    }

    fn env<'a>(archetypes: &'a ContentArchetypes, dice: &'a PcgDice) -> CoreEnv<'a> {
        CoreEnv::new(archetypes, dice)
    }

    // ===== turn cycle =====

    fn start_combat(&mut self, seeds: Vec<InitiativeSeed>) -> Result<()> {
        let mut working = self.state.clone();
        CombatEngine::new(&mut working).start_combat(seeds)?;

        self.cancel_pending_advance();
        self.commit(working);

        if let Some(first) = self.state.turn.current {
            self.events.publish(Event::Turn(TurnEvent::CombatStarted {
                order: self.state.turn.order.clone(),
                first,
            }));
        }
        Ok(())
    }

    fn end_combat(&mut self) -> Result<()> {
        self.cancel_pending_advance();

        let mut working = self.state.clone();
        CombatEngine::new(&mut working).end_combat();
        self.commit(working);

        self.events.publish(Event::Turn(TurnEvent::CombatEnded));
        Ok(())
    }

    fn advance_turn(&mut self) -> Result<AdvanceReport> {
        let mut working = self.state.clone();
        let result = CombatEngine::new(&mut working).advance_turn();
        match result {
            Ok(report) => {
                self.commit(working);
                self.events.publish(Event::Turn(TurnEvent::TurnAdvanced {
                    current: report.current,
                    round: report.round,
                }));
                Ok(report)
            }
            Err(TurnError::EmptyOrder) if !working.turn.active => {
                // The cleanup pass emptied the order and the engine
                // already tore combat down.
                self.cancel_pending_advance();
                self.commit(working);
                self.events.publish(Event::Turn(TurnEvent::CombatEnded));
                Err(TurnError::EmptyOrder.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn reorder(&mut self, order: Vec<EntryId>) -> Result<()> {
        let mut working = self.state.clone();
        CombatEngine::new(&mut working).reorder(order)?;
        self.commit(working);
        self.events.publish(Event::Turn(TurnEvent::OrderChanged {
            order: self.state.turn.order.clone(),
        }));
        Ok(())
    }

    // ===== roster =====

    fn request_move(&mut self, token: TokenId, destination: Position) -> Result<()> {
        let from = self
            .state
            .token(token)
            .ok_or(RuntimeError::TokenNotFound(token))?
            .position;

        let mut working = self.state.clone();
        CombatEngine::new(&mut working).request_move(token, destination)?;
        self.commit(working);

        self.events.publish(Event::Combat(CombatEvent::PositionChanged {
            token,
            from,
            to: destination,
        }));
        Ok(())
    }

    fn spawn_token(&mut self, spec: TokenSpec) -> Result<TokenId> {
        let name = spec.name.clone();
        let position = spec.position;

        let mut working = self.state.clone();
        let token = CombatEngine::new(&mut working).spawn_token(spec)?;
        self.commit(working);

        self.events.publish(Event::Combat(CombatEvent::TokenSpawned {
            token,
            name,
            position,
        }));
        Ok(token)
    }

    fn remove_token(&mut self, token: TokenId) -> Result<()> {
        let mut working = self.state.clone();
        CombatEngine::new(&mut working).remove_token(token)?;
        self.commit(working);

        self.events
            .publish(Event::Combat(CombatEvent::TokenRemoved { token }));
        Ok(())
    }

    fn apply_damage(&mut self, token: TokenId, amount: u32) -> Result<DamageReport> {
        let mut working = self.state.clone();
        let report = CombatEngine::new(&mut working).apply_damage(token, amount)?;
        self.commit(working);

        if report.defeated {
            self.events.publish(Event::Combat(CombatEvent::TokenDefeated {
                token: report.token,
                removed: report.removed,
            }));
        }
        Ok(report)
    }

    fn heal(&mut self, token: TokenId, amount: u32) -> Result<u32> {
        let mut working = self.state.clone();
        let restored = CombatEngine::new(&mut working).heal(token, amount)?;
        self.commit(working);
        Ok(restored)
    }

    // ===== hazards =====

    fn place_mine(&mut self, spec: MineSpec) -> Result<MineId> {
        let position = spec.position;
        let mut working = self.state.clone();
        let mine = CombatEngine::new(&mut working).place_mine(spec)?;
        self.commit(working);

        self.events
            .publish(Event::Hazard(HazardEvent::MinePlaced { mine, position }));
        Ok(mine)
    }

    fn reveal_mine(&mut self, mine: MineId) -> Result<()> {
        let mut working = self.state.clone();
        CombatEngine::new(&mut working).reveal_mine(mine)?;
        self.commit(working);

        self.events
            .publish(Event::Hazard(HazardEvent::MineRevealed { mine }));
        Ok(())
    }

    fn trigger_mine(&mut self, mine: MineId, token: TokenId) -> Result<MineBlast> {
        let mut working = self.state.clone();
        let blast = {
            let env = Self::env(&self.archetypes, &self.dice);
            CombatEngine::new(&mut working).trigger_mine(&env, mine, token)?
        };
        if blast.already_triggered {
            // Idempotent no-op; nothing to commit or announce.
            return Ok(blast);
        }
        self.commit(working);

        for casualty in &blast.casualties {
            if casualty.defeated {
                self.events.publish(Event::Combat(CombatEvent::TokenDefeated {
                    token: casualty.token,
                    removed: casualty.removed,
                }));
            }
        }
        if let Some(spawned) = blast.spawned
            && let Some(spawned_token) = self.state.token(spawned)
        {
            self.events.publish(Event::Combat(CombatEvent::TokenSpawned {
                token: spawned,
                name: spawned_token.name.clone(),
                position: spawned_token.position,
            }));
        }
        self.events.publish(Event::Hazard(HazardEvent::MineDetonated {
            mine,
            casualties: blast.casualties.iter().map(|c| c.token).collect(),
            spawned: blast.spawned,
        }));
        Ok(blast)
    }

    fn activate_storm(&mut self, total_rounds: u32, stacks: u32) -> Result<()> {
        let mut working = self.state.clone();
        CombatEngine::new(&mut working).activate_storm(total_rounds, stacks)?;
        self.commit(working);

        self.events
            .publish(Event::Hazard(HazardEvent::StormActivated { total_rounds }));
        Ok(())
    }

    fn storm_tick(&mut self) -> Result<StormTick> {
        let mut working = self.state.clone();
        let outcome = {
            let env = Self::env(&self.archetypes, &self.dice);
            CombatEngine::new(&mut working).storm_tick(&env)?
        };
        self.commit(working);

        match &outcome {
            StormTick::Struck(roll) => {
                self.events
                    .publish(Event::Hazard(HazardEvent::StormStruck { roll: roll.clone() }));
            }
            StormTick::Ended => {
                self.events.publish(Event::Hazard(HazardEvent::StormEnded));
            }
        }
        Ok(outcome)
    }

    fn resolve_storm_roll(&mut self, roll: RollId, damage: u32) -> Result<StormStrikeReport> {
        let mut working = self.state.clone();
        let report = CombatEngine::new(&mut working).resolve_storm_attack(roll, damage)?;
        self.commit(working);

        if let Some(damage_report) = &report.report
            && damage_report.defeated
        {
            self.events.publish(Event::Combat(CombatEvent::TokenDefeated {
                token: damage_report.token,
                removed: damage_report.removed,
            }));
        }
        if report.storm_ended {
            self.events.publish(Event::Hazard(HazardEvent::StormEnded));
        }
        Ok(report)
    }

    // ===== pending actions =====

    fn resolve_action(&mut self, action: ActionId, hit: bool, damage: u32) -> Result<()> {
        let mut working = self.state.clone();

        let target = {
            let Some(pending) = working.pending_action_mut(action) else {
                return Err(RuntimeError::ActionNotFound(action));
            };
            if pending.resolved && pending.damage_applied {
                // Confirmation arrived twice; the first one won.
                return Ok(());
            }
            pending.hit = Some(hit);
            pending.damage = Some(damage);
            pending.resolved = true;
            pending.target
        };

        let mut defeat: Option<DamageReport> = None;
        if hit && damage > 0
            && let Some(target) = target
        {
            match CombatEngine::new(&mut working).apply_damage(target, damage) {
                Ok(report) => defeat = Some(report),
                Err(err) => {
                    debug!(%target, error = %err, "pending action target gone before damage applied");
                }
            }
        }

        // Applied confirmations leave the document.
        working.pending_actions.retain(|pending| pending.id != action);
        self.commit(working);

        self.events.publish(Event::Combat(CombatEvent::ActionResolved {
            action,
            target,
            hit,
            damage,
        }));
        if let Some(report) = defeat
            && report.defeated
        {
            self.events.publish(Event::Combat(CombatEvent::TokenDefeated {
                token: report.token,
                removed: report.removed,
            }));
        }
        Ok(())
    }

    // ===== enemy turns =====

    async fn run_enemy_turn(&mut self, entry: EntryId) -> Result<()> {
        if self.enemy_turn_active {
            return Err(RuntimeError::EnemyTurnInProgress);
        }
        if !self.state.turn.active {
            return Err(TurnError::Inactive.into());
        }
        if self.state.turn.current != Some(entry) {
            return Err(RuntimeError::StaleTurn(entry));
        }
        let slot = self
            .state
            .turn
            .entry(entry)
            .ok_or(RuntimeError::EntryNotFound(entry))?;
        if slot.faction != Faction::Enemy {
            return Err(RuntimeError::NotEnemySlot(entry));
        }

        // Groups act as one pooled actor: the first living member
        // decides and moves for the slot.
        let actor = match slot.kind {
            EntryKind::Single { token } => self
                .state
                .token(token)
                .filter(|token| token.is_alive())
                .map(|token| token.id),
            EntryKind::Group { archetype } => self
                .state
                .group_members(archetype)
                .next()
                .map(|token| token.id),
        };

        let Some(actor) = actor else {
            // The slot is already dead; skip the turn without a preview.
            warn!(%entry, "enemy slot has no living actor; skipping turn");
            self.enemy_turn_active = true;
            self.schedule_finish(entry, Duration::ZERO);
            return Ok(());
        };

        let mut working = self.state.clone();
        working.next_nonce();

        let intent = match self
            .provider
            .provide_intent(actor, &working, &self.config.combat)
            .await
        {
            Ok(intent) => intent,
            Err(err) => {
                // A stalled turn blocks the whole table; degrade and
                // move on.
                warn!(%actor, error = %err, "enemy decision failed; holding position");
                ActionIntent::Hold
            }
        };

        let outcome = self.apply_intent(&mut working, actor, intent);
        self.commit(working);
        for event in outcome {
            self.events.publish(event);
        }

        self.enemy_turn_active = true;
        self.schedule_finish(entry, self.config.turn_preview_delay);
        Ok(())
    }

    /// Apply one intent to the working state. Never fails: an
    /// unapplicable part degrades to nothing and the turn proceeds.
    fn apply_intent(
        &self,
        working: &mut SessionState,
        actor: TokenId,
        intent: ActionIntent,
    ) -> Vec<Event> {
        let mut out = Vec::new();
        match intent {
            ActionIntent::Hold => {}
            ActionIntent::Move { from, to } => {
                if self.apply_move(working, actor, to) {
                    out.push(Event::Combat(CombatEvent::PositionChanged {
                        token: actor,
                        from,
                        to,
                    }));
                }
            }
            ActionIntent::Attack { target, attack } => {
                let action = self.queue_pending(working, actor, Some(target), &attack);
                out.push(Event::Combat(CombatEvent::PendingActionQueued { action }));
            }
            ActionIntent::Ability {
                target,
                ability,
                recharge_rounds,
            } => {
                let action = self.queue_pending(working, actor, Some(target), &ability);
                CombatEngine::new(working).arm_ability_cooldown(
                    actor,
                    &ability.name,
                    recharge_rounds,
                );
                out.push(Event::Combat(CombatEvent::PendingActionQueued { action }));
            }
            ActionIntent::MoveThenAttack {
                from,
                to,
                target,
                attack,
            } => {
                if self.apply_move(working, actor, to) {
                    out.push(Event::Combat(CombatEvent::PositionChanged {
                        token: actor,
                        from,
                        to,
                    }));
                }
                let action = self.queue_pending(working, actor, Some(target), &attack);
                out.push(Event::Combat(CombatEvent::PendingActionQueued { action }));
            }
        }
        out
    }

    fn apply_move(&self, working: &mut SessionState, actor: TokenId, to: Position) -> bool {
        match CombatEngine::new(working).request_move(actor, to) {
            Ok(()) => true,
            Err(err) => {
                // Planner output is re-validated here; staying put is
                // the correct degradation.
                debug!(%actor, error = %err, "planned move rejected; holding position");
                false
            }
        }
    }

    /// Roll to-hit and park the strike as a pending action awaiting the
    /// external damage confirmation.
    fn queue_pending(
        &self,
        working: &mut SessionState,
        actor: TokenId,
        target: Option<TokenId>,
        attack: &AttackSpec,
    ) -> PendingAction {
        let seed = mix_seed(working.session_seed, working.next_nonce(), actor.0, 2);
        let to_hit_roll = self.dice.roll_d20(seed) + attack.to_hit_bonus;

        let actor_name = working
            .token(actor)
            .map(|token| token.name.clone())
            .unwrap_or_default();
        let target_name = target
            .and_then(|id| working.token(id))
            .map(|token| token.name.clone());

        let action = PendingAction {
            id: working.allocate_action_id(),
            actor,
            actor_name,
            target,
            target_name,
            ability_name: attack.name.clone(),
            damage_expr: attack.damage_expr.clone(),
            to_hit_roll,
            hit: None,
            damage: None,
            resolved: false,
            damage_applied: false,
            is_enemy_action: true,
        };
        working.pending_actions.push(action.clone());
        action
    }

    /// The preview timer fired: clear the guard and advance, unless the
    /// world moved on underneath the timer.
    fn finish_enemy_turn(&mut self, entry: EntryId) {
        self.enemy_turn_active = false;
        self.pending_advance = None;

        if !self.state.turn.active {
            return;
        }
        if self.state.turn.current != Some(entry) {
            warn!(%entry, "stale turn-complete signal ignored");
            return;
        }
        if let Err(err) = self.advance_turn() {
            warn!(%entry, error = %err, "turn advance after enemy action failed");
        }
    }

    fn schedule_finish(&mut self, entry: EntryId, delay: Duration) {
        let finish_tx = self.finish_tx.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = finish_tx.send(entry).await;
        });
        self.pending_advance = Some(timer);
    }

    /// Abort the outstanding preview timer, if any, and drop the guard.
    /// Part of the atomic teardown on combat end and session reset.
    fn cancel_pending_advance(&mut self) {
        if let Some(timer) = self.pending_advance.take() {
            timer.abort();
        }
        self.enemy_turn_active = false;
    }
}
