//! Stage transition tables.
//!
//! A table is a forward-only chain of stages. Each stage may carry side
//! effects that are applied when a record enters it: a progress value and
//! date fields to stamp with the current time. Stages a domain defines but
//! leaves out of the chain (an "On Hold" excursion, say) never advance.

use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use super::entity::Record;

/// Upper bound of a record's completion percentage.
pub const MAX_PROGRESS: u8 = 100;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown stage '{0}'")]
pub struct UnknownStage(pub String);

/// Rejects a progress value above [`MAX_PROGRESS`].
pub fn check_progress(progress: u8) -> Result<(), String> {
    if progress > MAX_PROGRESS {
        return Err(format!("progress {} is outside 0..={}", progress, MAX_PROGRESS));
    }
    Ok(())
}

/// A lifecycle position of a domain record.
pub trait Stage:
    Copy
    + Eq
    + Hash
    + Debug
    + Display
    + FromStr<Err = UnknownStage>
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// Every stage the domain defines, chain stages first.
    fn all() -> &'static [Self];
}

/// Declares a stage enum whose serialized and displayed form is its
/// human-readable label. Deserializing goes through `FromStr`, so labels
/// in stored data and patches match regardless of case.
macro_rules! stage_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
        $vis enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::record::stage::UnknownStage;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                <$name as $crate::record::stage::Stage>::all()
                    .iter()
                    .find(|stage| stage.label().eq_ignore_ascii_case(wanted))
                    .copied()
                    .ok_or_else(|| $crate::record::stage::UnknownStage(s.to_string()))
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let label = <String as serde::Deserialize>::deserialize(deserializer)?;
                label.parse::<Self>().map_err(serde::de::Error::custom)
            }
        }

        impl $crate::record::stage::Stage for $name {
            fn all() -> &'static [Self] {
                &[$($name::$variant),+]
            }
        }
    };
}

pub(crate) use stage_enum;

/// What happens to a record when it enters a stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageEffect {
    /// Progress percentage to set.
    pub progress: Option<u8>,
    /// Date fields to stamp with the current time.
    pub stamps: Vec<&'static str>,
}

/// Ordered chain of stages with per-stage side effects.
#[derive(Debug, Clone)]
pub struct StageTable<S: Stage> {
    stages: Vec<S>,
    effects: HashMap<S, StageEffect>,
}

impl<S: Stage> StageTable<S> {
    /// Starts a chain at its initial stage.
    pub fn starting_at(initial: S) -> Self {
        Self {
            stages: vec![initial],
            effects: HashMap::new(),
        }
    }

    /// Appends the next stage of the chain.
    pub fn then(mut self, stage: S) -> Self {
        debug_assert!(
            !self.stages.contains(&stage),
            "stage {} appears twice in the chain",
            stage
        );
        self.stages.push(stage);
        self
    }

    /// Sets the progress applied on entering the most recently added stage.
    pub fn with_progress(mut self, progress: u8) -> Self {
        let stage = self.last_added();
        self.effects.entry(stage).or_default().progress = Some(progress.min(MAX_PROGRESS));
        self
    }

    /// Adds a date field stamped on entering the most recently added stage.
    pub fn stamping(mut self, field: &'static str) -> Self {
        let stage = self.last_added();
        self.effects.entry(stage).or_default().stamps.push(field);
        self
    }

    fn last_added(&self) -> S {
        self.stages[self.stages.len() - 1]
    }

    pub fn stages(&self) -> &[S] {
        &self.stages
    }

    pub fn initial(&self) -> S {
        self.stages[0]
    }

    /// The last stage of the chain.
    pub fn terminal(&self) -> S {
        self.last_added()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn contains(&self, stage: S) -> bool {
        self.stages.contains(&stage)
    }

    pub fn position(&self, stage: S) -> Option<usize> {
        self.stages.iter().position(|s| *s == stage)
    }

    /// The stage following `stage`, or `None` at the end of the chain and
    /// for stages outside it.
    pub fn next(&self, stage: S) -> Option<S> {
        self.position(stage)
            .and_then(|idx| self.stages.get(idx + 1))
            .copied()
    }

    pub fn can_advance(&self, stage: S) -> bool {
        self.next(stage).is_some()
    }

    /// Side effects of entering `stage`.
    pub fn side_effects(&self, stage: S) -> Option<&StageEffect> {
        self.effects.get(&stage)
    }

    /// Moves `record` into `stage` and applies that stage's side effects.
    ///
    /// Does not touch `updatedDate`; the caller stamps it.
    pub fn enter<R>(&self, record: &mut R, stage: S, now: DateTime<Utc>)
    where
        R: Record<Stage = S>,
    {
        record.set_stage(stage);
        if let Some(effect) = self.effects.get(&stage) {
            if let Some(progress) = effect.progress {
                record.set_progress(progress);
            }
            for field in &effect.stamps {
                if !record.stamp(field, now) {
                    log::warn!(
                        "Stage '{}' stamps unknown date field '{}' on {} record {}",
                        stage,
                        field,
                        R::COLLECTION,
                        record.id()
                    );
                }
            }
        }
        record.on_stage_entered(stage, now);
    }
}
