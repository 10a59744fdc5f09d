//! Dialogue engine: one conversation at a time.
//!
//! ```text
//! Closed ─open─► Greeting ─settle─► AwaitingSelection ─select─► ResponsePending
//!                    │                     ▲                          │
//!                    └──────select─────────┼──────────────────────────┤
//!                                          │                      resolve
//!                                        settle                       │
//!                                          └────── ResponseShown ◄────┘
//! any Open state ─close─► Closed
//! ```
//!
//! The engine never generates replies itself. Selecting a question yields a
//! [`ReplyRequest`] tagged with a [`ReplyTicket`]; whoever produces the
//! answer hands it back through [`DialogueEngine::resolve`]. A ticket that no
//! longer matches the open session is discarded, so a late answer can never
//! land in a different conversation.

use std::fmt;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

use crate::config::DialogueConfig;
use crate::error::{Result, TourError};
use crate::replies::{self, ReplyBook};
use crate::types::{CharacterId, ReplyTicket, SessionId};
use crate::world::{Character, CharacterTraits, World};

/// Questions offered as one-click options. Each turn shows a fresh draw.
pub const QUESTION_POOL: &[&str] = &[
    "What is your role here?",
    "What does a typical day look like for you?",
    "What is the biggest challenge in your work?",
    "What is the most rewarding part of the work?",
    "Why does this policy matter for students?",
    "What project are you working on right now?",
    "How do you approach a student who is struggling?",
    "What data do you rely on in your work?",
    "What does the future of student counseling look like?",
    "How do you support students' mental health?",
    "What is your daily routine before classes start?",
    "What obstacle surprised you most when you started?",
    "What are you most proud of this year?",
    "Which policies have helped students the most?",
    "What methods work best for building trust?",
    "What statistics do you track each term?",
    "What is your vision for next year?",
    "How can students manage exam stress?",
];

/// Greeting templates: `{name}`, `{role}` and `{quirk}` are filled in.
const GREETINGS: &[&str] = &[
    "Hi there! I'm {name}, the {role} here. Ask me anything!",
    "Oh, hello! {name} here. I'm the {role}. (You might notice I {quirk}.) What would you like to know?",
    "Welcome to the tour! My name is {name} and I work as the {role}. How can I help?",
    "Hey! Good to see a new face. I'm {name}, {role}. What's on your mind?",
];

/// Conversation phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No session.
    Closed,
    /// Just opened; greeting shown.
    Greeting,
    /// Options shown, waiting for the player.
    AwaitingSelection,
    /// A reply is outstanding.
    ResponsePending,
    /// A reply just arrived.
    ResponseShown,
}

impl Phase {
    /// Whether a session is open.
    #[must_use]
    pub fn is_open(self) -> bool {
        self != Self::Closed
    }
}

/// One line of the rendered transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine {
    /// Who is speaking.
    pub speaker: String,
    /// What they said.
    pub text: String,
    /// True for the transient "thinking" marker.
    pub pending: bool,
}

impl fmt::Display for TranscriptLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.speaker, self.text)
    }
}

/// The open conversation.
#[derive(Debug, Clone)]
pub struct DialogueSession {
    id: SessionId,
    character: CharacterId,
    phase: Phase,
    transcript: Vec<TranscriptLine>,
    options: Vec<String>,
    last_question: Option<String>,
    presented: bool,
    /// Free-text question being typed.
    pub input: String,
}

impl DialogueSession {
    /// Session identity.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Conversation partner.
    #[must_use]
    pub fn character(&self) -> CharacterId {
        self.character
    }

    /// Current phase (never `Closed`).
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Transcript lines, oldest first.
    #[must_use]
    pub fn transcript(&self) -> &[TranscriptLine] {
        &self.transcript
    }

    /// Transcript as newline-separated `speaker: text` lines.
    #[must_use]
    pub fn transcript_text(&self) -> String {
        self.transcript
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Options currently on offer.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// The question asked in the most recent turn.
    #[must_use]
    pub fn last_question(&self) -> Option<&str> {
        self.last_question.as_deref()
    }

    fn ticket(&self) -> ReplyTicket {
        ReplyTicket {
            session: self.id,
            character: self.character,
        }
    }
}

/// Work order for whoever produces replies.
#[derive(Debug, Clone)]
pub struct ReplyRequest {
    /// Tag to return with the answer.
    pub ticket: ReplyTicket,
    /// Who is answering.
    pub traits: CharacterTraits,
    /// Their offline lines, for the fallback path.
    pub book: ReplyBook,
    /// What was asked.
    pub question: String,
}

/// Outcome of handing a reply back to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The reply was shown and logged.
    Applied,
    /// The ticket no longer matches the open session; the reply was dropped.
    Stale,
}

/// Draw up to `count` distinct questions from the pool, skipping `exclude`.
pub fn draw_options<R: Rng + ?Sized>(count: usize, exclude: Option<&str>, rng: &mut R) -> Vec<String> {
    let eligible: Vec<&str> = QUESTION_POOL
        .iter()
        .copied()
        .filter(|q| Some(*q) != exclude)
        .collect();
    eligible
        .choose_multiple(rng, count)
        .map(|q| (*q).to_string())
        .collect()
}

/// Fill a greeting template for this character.
pub fn greeting<R: Rng + ?Sized>(traits: &CharacterTraits, rng: &mut R) -> String {
    let template = GREETINGS.choose(rng).copied().unwrap_or(GREETINGS[0]);
    template
        .replace("{name}", &traits.name)
        .replace("{role}", &traits.role)
        .replace("{quirk}", &traits.quirk)
}

/// Owns at most one [`DialogueSession`].
#[derive(Debug, Clone)]
pub struct DialogueEngine {
    config: DialogueConfig,
    session: Option<DialogueSession>,
}

impl DialogueEngine {
    /// Create a closed engine.
    #[must_use]
    pub fn new(config: DialogueConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.session.as_ref().map_or(Phase::Closed, |s| s.phase)
    }

    /// Whether a session is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// The open session.
    #[must_use]
    pub fn session(&self) -> Option<&DialogueSession> {
        self.session.as_ref()
    }

    /// The open session, mutably (for editing the input buffer).
    pub fn session_mut(&mut self) -> Option<&mut DialogueSession> {
        self.session.as_mut()
    }

    /// Open a conversation with `character`, replacing any open one.
    pub fn open<R: Rng + ?Sized>(&mut self, character: &Character, rng: &mut R) -> SessionId {
        if let Some(previous) = self.close() {
            debug!(target: "dialogue", session = %previous, "replaced by new session");
        }
        let id = SessionId::new();
        let hello = greeting(&character.traits, rng);
        let options = draw_options(self.config.options_per_turn, None, rng);
        info!(target: "dialogue", session = %id, character = character.name(), "dialogue opened");
        self.session = Some(DialogueSession {
            id,
            character: character.id,
            phase: Phase::Greeting,
            transcript: vec![TranscriptLine {
                speaker: character.traits.name.clone(),
                text: hello,
                pending: false,
            }],
            options,
            last_question: None,
            presented: false,
            input: String::new(),
        });
        id
    }

    /// Pick one of the presented options.
    ///
    /// # Errors
    /// `NoSession`, `ReplyPending`, or `OptionOutOfRange`.
    pub fn select_option(&mut self, index: usize, world: &World) -> Result<ReplyRequest> {
        let session = self.session.as_ref().ok_or(TourError::NoSession)?;
        let question = session
            .options
            .get(index)
            .cloned()
            .ok_or(TourError::OptionOutOfRange {
                index,
                available: session.options.len(),
            })?;
        self.ask(question, world)
    }

    /// Send the free-text input buffer as a question and clear it.
    ///
    /// # Errors
    /// `NoSession`, `ReplyPending`, or `EmptyQuestion`.
    pub fn submit_input(&mut self, world: &World) -> Result<ReplyRequest> {
        let session = self.session.as_mut().ok_or(TourError::NoSession)?;
        let question = session.input.trim().to_string();
        if question.is_empty() {
            return Err(TourError::EmptyQuestion);
        }
        let request = self.ask(question, world)?;
        if let Some(session) = self.session.as_mut() {
            session.input.clear();
        }
        Ok(request)
    }

    /// Ask a question: transcript gets the player's line and a pending
    /// marker, and the phase becomes `ResponsePending`.
    ///
    /// # Errors
    /// `NoSession`, `ReplyPending`, `EmptyQuestion`, or `CharacterNotFound`.
    pub fn ask(&mut self, question: String, world: &World) -> Result<ReplyRequest> {
        let session = self.session.as_mut().ok_or(TourError::NoSession)?;
        if session.phase == Phase::ResponsePending {
            return Err(TourError::ReplyPending);
        }
        let question = question.trim().to_string();
        if question.is_empty() {
            return Err(TourError::EmptyQuestion);
        }
        let character = world
            .character(session.character)
            .ok_or(TourError::CharacterNotFound(session.character))?;

        session.transcript.push(TranscriptLine {
            speaker: self.config.player_label.clone(),
            text: question.clone(),
            pending: false,
        });
        session.transcript.push(TranscriptLine {
            speaker: character.traits.name.clone(),
            text: self.config.pending_marker.clone(),
            pending: true,
        });
        session.phase = Phase::ResponsePending;
        session.last_question = Some(question.clone());
        debug!(target: "dialogue", session = %session.id, %question, "reply requested");

        Ok(ReplyRequest {
            ticket: session.ticket(),
            traits: character.traits.clone(),
            book: character.book.clone(),
            question,
        })
    }

    /// Hand back the reply for `ticket`.
    ///
    /// On a matching ticket the pending marker is replaced, the exchange is
    /// appended to the character's log, a fresh option set is drawn (never
    /// repeating the question just answered), and the phase becomes
    /// `ResponseShown`. An empty reply is replaced by a fallback line.
    pub fn resolve<R: Rng + ?Sized>(
        &mut self,
        ticket: ReplyTicket,
        reply: &str,
        world: &mut World,
        rng: &mut R,
    ) -> Resolution {
        let Some(session) = self.session.as_mut() else {
            debug!(target: "dialogue", session = %ticket.session, "reply arrived after close; dropped");
            return Resolution::Stale;
        };
        if session.ticket() != ticket || session.phase != Phase::ResponsePending {
            debug!(target: "dialogue", session = %ticket.session, "stale reply dropped");
            return Resolution::Stale;
        }
        let Some(character) = world.character_mut(ticket.character) else {
            return Resolution::Stale;
        };
        let question = session.last_question.clone().unwrap_or_default();
        let reply = if reply.trim().is_empty() {
            replies::fallback_reply(&character.book, &question, rng)
        } else {
            reply.trim().to_string()
        };

        if let Some(line) = session.transcript.iter_mut().rev().find(|l| l.pending) {
            line.text.clone_from(&reply);
            line.pending = false;
        }
        character.record_exchange(question.clone(), reply);
        session.options = draw_options(self.config.options_per_turn, Some(&question), rng);
        session.phase = Phase::ResponseShown;
        session.presented = false;
        debug!(target: "dialogue", session = %session.id, "reply shown");
        Resolution::Applied
    }

    /// Record that the current phase reached the screen.
    pub fn mark_presented(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.presented = true;
        }
    }

    /// Advance transient phases (`Greeting`, `ResponseShown`) to
    /// `AwaitingSelection` once they have been presented. Called once per
    /// frame.
    pub fn settle(&mut self) {
        if let Some(session) = self.session.as_mut() {
            if session.presented && matches!(session.phase, Phase::Greeting | Phase::ResponseShown) {
                session.phase = Phase::AwaitingSelection;
            }
        }
    }

    /// Close the open session, returning its id. The transcript is dropped;
    /// the character's conversation log is untouched.
    pub fn close(&mut self) -> Option<SessionId> {
        let session = self.session.take()?;
        info!(target: "dialogue", session = %session.id, "dialogue closed");
        Some(session.id)
    }
}
