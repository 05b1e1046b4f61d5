use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use rand::seq::{IndexedRandom, SliceRandom};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::Instant;

use crate::bank::{Question, QuestionBank};
use crate::combat::CombatState;
use crate::config::GameConfig;
use crate::model::client_message::ClientMessage;
use crate::model::run_state::{Phase, RunState};
use crate::model::server_message::{Outcome, RunReport, ServerMessage, StateSnapshot, send_msg};
use crate::score::ScoreEngine;
use crate::source::QuestionSource;
use crate::stats::{RunStats, StatsReporter};
use crate::timer::QuestionTimer;

pub type CommandTx = UnboundedSender<ClientMessage>;
pub type CommandRx = UnboundedReceiver<ClientMessage>;
pub type EventTx = UnboundedSender<ServerMessage>;
pub type EventRx = UnboundedReceiver<ServerMessage>;

/// Events produced by the controller's own spawned tasks: timer ticks,
/// countdown steps, and the delayed phase transitions. Every event carries
/// the generation it was scheduled under; the controller bumps its
/// generation whenever pending work becomes invalid, so a stale event can
/// never mutate a newer state.
#[derive(Debug)]
pub enum InternalEvent {
    CountdownStep { generation: u64, label: &'static str },
    CountdownFinished { generation: u64 },
    TimerTick { generation: u64 },
    NextQuestionDue { generation: u64 },
    EndDue { generation: u64 },
}

/// The two ends of a running game session.
pub struct GameHandle {
    pub commands: CommandTx,
    pub events: EventRx,
}

struct ActiveQuestion {
    question: Question,
    presented_at: Instant,
    /// Response time accrued before the latest pause.
    active_before_pause: Duration,
}

/// Owns one run's entire mutable state and processes commands and internal
/// events strictly one at a time. There are no other writers: the timer and
/// the delayed transitions only send messages back into this task.
pub struct GameController<S, R> {
    config: GameConfig,
    category: String,
    source: Arc<S>,
    reporter: Arc<R>,
    events_tx: EventTx,
    internal_tx: UnboundedSender<InternalEvent>,
    state: RunState,
    combat: CombatState,
    score: ScoreEngine,
    bank: Option<QuestionBank>,
    active: Option<ActiveQuestion>,
    timer: QuestionTimer,
    generation: u64,
}

impl<S: QuestionSource, R: StatsReporter> GameController<S, R> {
    /// Spawn a session task and hand back its command/event channels.
    /// Dropping the command sender shuts the session down.
    pub fn spawn(
        config: GameConfig,
        category: String,
        source: Arc<S>,
        reporter: Arc<R>,
    ) -> GameHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();

        let controller = Self {
            combat: CombatState::new(config.max_hp),
            score: ScoreEngine::new(config.scoring.clone()),
            config,
            category,
            source,
            reporter,
            events_tx,
            internal_tx,
            state: RunState::new(),
            bank: None,
            active: None,
            timer: QuestionTimer::new(),
            generation: 0,
        };
        tokio::spawn(controller.run(command_rx, internal_rx));

        GameHandle {
            commands: command_tx,
            events: events_rx,
        }
    }

    async fn run(mut self, mut commands: CommandRx, mut internal: UnboundedReceiver<InternalEvent>) {
        loop {
            tokio::select! {
                cmd = commands.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd).await,
                    // Presentation side went away, tear the session down.
                    None => break,
                },
                Some(event) = internal.recv() => self.handle_internal(event),
            }
        }
        self.timer.cancel();
        info!("Game session ended");
    }

    async fn handle_command(&mut self, cmd: ClientMessage) {
        match cmd {
            ClientMessage::StartRun => self.start_run().await,
            ClientMessage::SubmitAnswer { option } => self.submit_answer(option),
            ClientMessage::Pause => self.pause(),
            ClientMessage::Resume => self.resume(),
            ClientMessage::GoHome => self.go_home(),
        }
    }

    fn handle_internal(&mut self, event: InternalEvent) {
        match event {
            InternalEvent::CountdownStep { generation, label } => {
                if !self.event_is_current(generation, Phase::Countdown) {
                    return;
                }
                self.emit(ServerMessage::CountdownStep {
                    label: label.to_string(),
                });
            }
            InternalEvent::CountdownFinished { generation } => {
                if !self.event_is_current(generation, Phase::Countdown) {
                    return;
                }
                self.state.started_at = Some(Instant::now());
                self.present_next_question();
            }
            InternalEvent::TimerTick { generation } => {
                if !self.event_is_current(generation, Phase::AwaitingAnswer) {
                    return;
                }
                self.state.time_remaining -= 1;
                if self.state.time_remaining >= 0 {
                    self.emit(ServerMessage::TimerTick {
                        seconds_remaining: self.state.time_remaining as u32,
                    });
                } else {
                    // time_remaining is now the -1 sentinel
                    self.handle_timeout();
                }
            }
            InternalEvent::NextQuestionDue { generation } => {
                if !self.event_is_current(generation, Phase::Resolving) {
                    return;
                }
                self.present_next_question();
            }
            InternalEvent::EndDue { generation } => {
                if !self.event_is_current(generation, Phase::Resolving) {
                    return;
                }
                self.end_run();
            }
        }
    }

    /// The re-entrancy guard: an internal event only applies if nothing has
    /// invalidated it since it was scheduled and the phase still matches.
    fn event_is_current(&self, generation: u64, phase: Phase) -> bool {
        if generation != self.generation || self.state.phase != phase {
            debug!(
                "Dropping stale event scheduled at generation {generation} (now {}, phase {:?})",
                self.generation, self.state.phase
            );
            return false;
        }
        true
    }

    async fn start_run(&mut self) {
        if !matches!(self.state.phase, Phase::Menu | Phase::Ended) {
            debug!("Ignoring StartRun in phase {:?}", self.state.phase);
            return;
        }
        self.generation += 1;
        self.timer.cancel();
        self.state = RunState::new();
        self.combat = CombatState::new(self.config.max_hp);
        self.bank = None;
        self.active = None;

        let questions = match self.source.fetch(&self.category).await {
            Ok(questions) => questions,
            Err(e) => {
                warn!("Run start refused: {e}");
                self.emit(ServerMessage::error(e.to_string()));
                return;
            }
        };
        match QuestionBank::new(questions) {
            Ok(bank) => self.bank = Some(bank),
            Err(e) => {
                warn!("Run start refused: {e}");
                self.emit(ServerMessage::error(e.to_string()));
                return;
            }
        }

        info!("Run starting");
        self.state.phase = Phase::Countdown;
        self.emit_snapshot();
        self.spawn_countdown();
    }

    fn spawn_countdown(&self) {
        let generation = self.generation;
        let tx = self.internal_tx.clone();
        let step = self.config.countdown_step;
        let final_step = self.config.countdown_final;
        tokio::spawn(async move {
            for label in ["3", "2", "1"] {
                if tx
                    .send(InternalEvent::CountdownStep { generation, label })
                    .is_err()
                {
                    return;
                }
                tokio::time::sleep(step).await;
            }
            if tx
                .send(InternalEvent::CountdownStep {
                    generation,
                    label: "Fight!",
                })
                .is_err()
            {
                return;
            }
            tokio::time::sleep(final_step).await;
            let _ = tx.send(InternalEvent::CountdownFinished { generation });
        });
    }

    fn present_next_question(&mut self) {
        let Some(bank) = self.bank.as_mut() else {
            warn!("No question bank while presenting a question");
            return;
        };
        let question = bank.next();
        self.state.questions_presented += 1;
        self.state.time_remaining = self.config.question_seconds as i32;
        self.state.phase = Phase::AwaitingAnswer;

        let mut options = question.options.clone();
        options.shuffle(&mut rand::rng());
        let msg = ServerMessage::Question {
            prompt: question.prompt.clone(),
            options,
            seconds: self.config.question_seconds,
        };
        self.active = Some(ActiveQuestion {
            question,
            presented_at: Instant::now(),
            active_before_pause: Duration::ZERO,
        });

        self.generation += 1;
        self.timer.start(self.internal_tx.clone(), self.generation);
        self.emit(msg);
        self.emit_snapshot();
    }

    fn submit_answer(&mut self, option: i64) {
        if self.state.phase != Phase::AwaitingAnswer {
            debug!("Ignoring answer submission in phase {:?}", self.state.phase);
            return;
        }
        let Some(active) = self.active.take() else {
            warn!("Awaiting an answer with no active question");
            return;
        };
        self.timer.cancel();
        self.generation += 1;
        self.state.phase = Phase::Resolving;

        let response_time = active.active_before_pause + active.presented_at.elapsed();
        let correct_answer = active.question.correct_answer;
        if option == correct_answer {
            self.resolve_correct(response_time, correct_answer);
        } else {
            let damage = self.config.enemy_wrong_answer;
            self.resolve_miss(Outcome::Incorrect, damage, correct_answer);
        }
    }

    fn handle_timeout(&mut self) {
        self.timer.cancel();
        self.generation += 1;
        self.state.phase = Phase::Resolving;
        let Some(active) = self.active.take() else {
            warn!("Timed out with no active question");
            return;
        };
        let damage = self.config.enemy_timeout;
        self.resolve_miss(Outcome::TimedOut, damage, active.question.correct_answer);
    }

    fn resolve_correct(&mut self, response_time: Duration, correct_answer: i64) {
        self.state.consecutive_correct += 1;
        self.state.questions_correct += 1;
        let answer_score = self
            .score
            .score_correct(response_time, self.state.consecutive_correct);
        self.state.score += answer_score.points;
        self.combat.apply_player_attack(self.config.player_attack);

        self.emit(ServerMessage::Resolution {
            outcome: Outcome::Correct,
            points_earned: answer_score.points,
            rapid: answer_score.rapid,
            streak: answer_score.streak,
            correct_answer,
        });
        self.emit_snapshot();
        self.check_status();
    }

    fn resolve_miss(&mut self, outcome: Outcome, damage: u32, correct_answer: i64) {
        self.state.consecutive_correct = 0;
        self.state.questions_incorrect += 1;
        self.combat.apply_enemy_attack(damage);
        let answer_score = self.score.score_miss();

        self.emit(ServerMessage::Resolution {
            outcome,
            points_earned: answer_score.points,
            rapid: false,
            streak: false,
            correct_answer,
        });
        self.register_failure();
        self.emit_snapshot();
        self.check_status();
    }

    fn register_failure(&mut self) {
        self.state.failure_count += 1;
        if self.state.failure_count % self.config.taunt_frequency == 0 {
            if let Some(taunt) = self.config.taunts.choose(&mut rand::rng()) {
                self.emit(ServerMessage::Taunt {
                    text: taunt.clone(),
                });
            }
        }
    }

    fn check_status(&mut self) {
        if self.combat.is_boss_defeated() || self.combat.is_player_defeated() {
            self.state.completed = self.combat.is_boss_defeated();
            self.schedule(self.config.end_delay, |generation| InternalEvent::EndDue {
                generation,
            });
        } else {
            self.schedule(self.config.next_question_delay, |generation| {
                InternalEvent::NextQuestionDue { generation }
            });
        }
    }

    fn schedule(&self, delay: Duration, make: fn(u64) -> InternalEvent) {
        let generation = self.generation;
        let tx = self.internal_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(make(generation));
        });
    }

    fn end_run(&mut self) {
        self.state.phase = Phase::Ended;
        self.state.ended_at = Some(Instant::now());
        if self.state.completed {
            self.state.score += self.score.completion_bonus();
        }
        let normalized = self
            .score
            .normalize(self.state.score, self.state.questions_presented);

        let report = RunReport {
            completed: self.state.completed,
            final_score: self.state.score,
            normalized_score: normalized,
            questions_presented: self.state.questions_presented,
            questions_correct: self.state.questions_correct,
            questions_incorrect: self.state.questions_incorrect,
            time_spent_seconds: self.state.elapsed_seconds(),
        };
        info!("Run ended: {report:?}");
        self.emit(ServerMessage::RunEnded {
            report: report.clone(),
        });
        self.emit_snapshot();

        self.submit_stats(RunStats {
            normalized_score: normalized,
            time_spent_seconds: report.time_spent_seconds,
        });
    }

    fn submit_stats(&self, stats: RunStats) {
        let reporter = self.reporter.clone();
        let events_tx = self.events_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = reporter.submit(stats).await {
                warn!("Stats submission failed: {e}");
                send_msg(
                    &events_tx,
                    ServerMessage::Notice {
                        message: "Could not upload run statistics".to_string(),
                    },
                );
            }
        });
    }

    fn pause(&mut self) {
        if self.state.phase != Phase::AwaitingAnswer {
            debug!("Ignoring pause in phase {:?}", self.state.phase);
            return;
        }
        self.generation += 1;
        self.timer.pause();
        if let Some(active) = self.active.as_mut() {
            active.active_before_pause += active.presented_at.elapsed();
        }
        self.state.phase = Phase::Paused;

        let tip = self
            .config
            .pause_tips
            .choose(&mut rand::rng())
            .cloned()
            .unwrap_or_default();
        self.emit(ServerMessage::Paused { tip });
        self.emit_snapshot();
    }

    fn resume(&mut self) {
        if self.state.phase != Phase::Paused {
            debug!("Ignoring resume in phase {:?}", self.state.phase);
            return;
        }
        if let Some(active) = self.active.as_mut() {
            active.presented_at = Instant::now();
        }
        self.state.phase = Phase::AwaitingAnswer;
        self.generation += 1;
        self.timer
            .resume(self.internal_tx.clone(), self.generation);
        self.emit(ServerMessage::Resumed);
        self.emit_snapshot();
    }

    fn go_home(&mut self) {
        if self.state.phase != Phase::Ended {
            debug!("Ignoring GoHome in phase {:?}", self.state.phase);
            return;
        }
        self.generation += 1;
        self.timer.cancel();
        self.state = RunState::new();
        self.combat = CombatState::new(self.config.max_hp);
        self.bank = None;
        self.active = None;
        self.emit_snapshot();
    }

    fn emit(&self, msg: ServerMessage) {
        send_msg(&self.events_tx, msg);
    }

    fn emit_snapshot(&self) {
        self.emit(ServerMessage::Snapshot {
            state: StateSnapshot {
                phase: self.state.phase,
                player_hp: self.combat.player_hp(),
                boss_hp: self.combat.boss_hp(),
                max_hp: self.combat.max_hp(),
                score: self.state.score,
                time_remaining: self.state.time_remaining,
                consecutive_correct: self.state.consecutive_correct,
                questions_presented: self.state.questions_presented,
                questions_correct: self.state.questions_correct,
                questions_incorrect: self.state.questions_incorrect,
            },
        });
    }
}
