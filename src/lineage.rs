//! Scope automaton that assigns a dotted lineage to every notable token.
//!
//! Every purified token visits the `Registrar` exactly once, in order. The
//! registrar keeps a stack of scope frames: the file itself at the bottom, and
//! one frame per `class`/`def` whose body is still open. Indentation growth
//! and decline move a resilience counter; when a decline brings the counter
//! back to the baseline a frame was opened at, that frame is closed.
//!
//! A scope opener is seen before its name, so the name is captured on one
//! call and only written into the frame on the next. The name token itself
//! therefore still reports the enclosing lineage, which is where it is
//! declared.

use crate::codex::{Entity, Lexicon, Rule};
use crate::token::{Token, TokenKind};

/// Subjects that open a new scope.
const PROGENITORS: Entity = Entity::new(&[Rule::valued(TokenKind::Name, Lexicon::Encapsulators)]);

/// Names that address identities but are not identities themselves.
const HONOURIFICS: Entity = Entity::new(&[Rule::valued(TokenKind::Name, Lexicon::Reserved)]);

const IDENTITIES: Entity = Entity::new(&[Rule::kind(TokenKind::Name)]);

/// Member access joins identities into descendants.
const DESCENDERS: Entity = Entity::new(&[Rule::valued(TokenKind::Op, Lexicon::Accessor)]);

const GROWTH: Entity = Entity::new(&[Rule::kind(TokenKind::Indent)]);

const DECLINE: Entity = Entity::new(&[Rule::kind(TokenKind::Dedent)]);

/// Text subjects we want recorded.
const TRUE_SUBJECTS: Entity = Entity::new(&[Rule::kind(TokenKind::String), Rule::kind(TokenKind::Comment)]);

/// Whether the token names a real identity (a NAME that is not reserved).
pub fn is_true_identity(token: &Token) -> bool {
    IDENTITIES.is_entity(token) && !HONOURIFICS.is_entity(token)
}

pub fn is_progenitor(token: &Token) -> bool {
    PROGENITORS.is_entity(token)
}

pub fn is_descender(token: &Token) -> bool {
    DESCENDERS.is_entity(token)
}

pub fn is_true_subject(token: &Token) -> bool {
    TRUE_SUBJECTS.is_entity(token)
}

/// One open scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Scope name; empty until the heir is recorded.
    pub label: String,
    /// Resilience at the moment the frame was opened.
    pub baseline: i32,
}

/// Where the registrar is in the opener/name handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Just recording lineage.
    Recording,
    /// An opener pushed `frame`; the next true identity names it.
    AwaitingHeir { frame: usize },
    /// The name was found; it is written into `frame` on the next call.
    HeirFound { frame: usize, heir: String },
}

/// Lineage answer for a single token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// True when the token is the name that opens a new scope.
    pub new_family_line: bool,
    /// Dotted lineage, or `None` for tokens that do not get one.
    pub lineage: Option<String>,
}

impl Record {
    fn none() -> Self {
        Self {
            new_family_line: false,
            lineage: None,
        }
    }
}

/// Stack machine tracking scope lineage for one file.
#[derive(Debug, Clone)]
pub struct Registrar {
    register: Vec<Frame>,
    resilience: i32,
    disposition: Disposition,
}

impl Registrar {
    /// Create a registrar whose sentinel frame is labelled `registrant`.
    pub fn new(registrant: impl Into<String>) -> Self {
        Self {
            register: vec![Frame {
                label: registrant.into(),
                baseline: 0,
            }],
            resilience: 0,
            disposition: Disposition::Recording,
        }
    }

    /// Current frame stack, outermost first.
    pub fn frames(&self) -> &[Frame] {
        &self.register
    }

    pub fn disposition(&self) -> &Disposition {
        &self.disposition
    }

    pub fn resilience(&self) -> i32 {
        self.resilience
    }

    /// Record a token and return its lineage.
    pub fn record_history(&mut self, subject: &Token) -> Record {
        if self.lineage_fluxed(subject) {
            return Record::none();
        }

        self.record_heir();
        let new_family_line = self.seek_heir(subject);
        self.prepare_for_heir(subject);

        if is_true_identity(subject) || is_descender(subject) || is_true_subject(subject) {
            return Record {
                new_family_line,
                lineage: Some(self.entitle()),
            };
        }

        Record::none()
    }

    /// Dot-joined labels of every named frame.
    pub fn entitle(&self) -> String {
        let labels: Vec<&str> = self
            .register
            .iter()
            .map(|f| f.label.as_str())
            .filter(|l| !l.is_empty())
            .collect();
        labels.join(".").trim_matches('.').to_string()
    }

    fn lineage_fluxed(&mut self, subject: &Token) -> bool {
        if GROWTH.is_entity(subject) {
            self.resilience += 1;
            return true;
        }

        if DECLINE.is_entity(subject) {
            self.resilience -= 1;
            // The sentinel frame outlives every decline.
            if self.register.len() > 1 {
                if let Some(top) = self.register.last() {
                    if self.resilience <= top.baseline {
                        self.register.pop();
                    }
                }
            }
            return true;
        }

        false
    }

    fn record_heir(&mut self) {
        let disposition = std::mem::replace(&mut self.disposition, Disposition::Recording);
        match disposition {
            Disposition::HeirFound { frame, heir } => {
                if let Some(f) = self.register.get_mut(frame) {
                    f.label = heir;
                }
            }
            other => self.disposition = other,
        }
    }

    fn seek_heir(&mut self, subject: &Token) -> bool {
        if let Disposition::AwaitingHeir { frame } = self.disposition {
            if is_true_identity(subject) {
                self.disposition = Disposition::HeirFound {
                    frame,
                    heir: subject.text.clone(),
                };
                return true;
            }
        }
        false
    }

    fn prepare_for_heir(&mut self, subject: &Token) {
        if is_progenitor(subject) {
            self.register.push(Frame {
                label: String::new(),
                baseline: self.resilience,
            });
            self.disposition = Disposition::AwaitingHeir {
                frame: self.register.len() - 1,
            };
        }
    }
}
