//! Redirect resolver over a snapshot of session, funnel, and quest state.
//!
//! Rules are evaluated in priority order and the first one that applies
//! decides. Rules driven purely by state (funnel entry, first-quest outcome,
//! pending and failed quests, the signup prompt) own the decision as soon as
//! their state condition holds: they either redirect or accept the current
//! path, and lower rules are not consulted. Every destination lies inside the
//! set of paths its rule accepts, so re-running the resolver on the
//! destination with the same state yields no redirect.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::paths::{self, Screen};
use crate::config::NavigatorConfig;
use crate::funnel::FunnelStep;
use crate::quest::{QuestId, QuestLifecycleState};
use crate::session::SessionStatus;

/// Where the resolver wants the router to go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub target_path: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
}

impl Destination {
    #[must_use]
    pub fn to(target_path: impl Into<String>) -> Self {
        Self {
            target_path: target_path.into(),
            params: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Path with params rendered as a percent-encoded query string.
    #[must_use]
    pub fn href(&self) -> String {
        if self.params.is_empty() {
            return self.target_path.clone();
        }
        let query = self
            .params
            .iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(key),
                    urlencoding::encode(value)
                )
            })
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{query}", self.target_path)
    }

    /// Read back a path produced by [`Destination::href`].
    #[must_use]
    pub fn from_href(href: &str) -> Self {
        let (target_path, query) = href.split_once('?').unwrap_or((href, ""));
        let params = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode(key), decode(value))
            })
            .collect();
        Self {
            target_path: target_path.to_string(),
            params,
        }
    }
}

fn decode(raw: &str) -> String {
    urlencoding::decode(raw).map_or_else(|_| raw.to_string(), std::borrow::Cow::into_owned)
}

/// Outcome reported to the first-quest result screen.
pub const OUTCOME_PARAM: &str = "outcome";
pub const QUEST_ID_PARAM: &str = "id";

/// Resolver rules in priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    FunnelEntry,
    FirstQuestCompleted,
    FirstQuestFailed,
    PendingQuest,
    FailedQuest,
    FirstQuestCelebrated,
    SignupPrompt,
    AppEntry,
    OnboardingGate,
    SessionGate,
    SignupDismissed,
}

impl Rule {
    pub const ALL: &'static [Self] = &[
        Self::FunnelEntry,
        Self::FirstQuestCompleted,
        Self::FirstQuestFailed,
        Self::PendingQuest,
        Self::FailedQuest,
        Self::FirstQuestCelebrated,
        Self::SignupPrompt,
        Self::AppEntry,
        Self::OnboardingGate,
        Self::SessionGate,
        Self::SignupDismissed,
    ];

    #[must_use]
    pub const fn priority(self) -> u8 {
        self as u8
    }
}

/// The rule that claimed a snapshot and the redirect it asks for, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub rule: Rule,
    pub destination: Option<Destination>,
}

impl Decision {
    fn guard(rule: Rule, accepted: bool, destination: impl FnOnce() -> Destination) -> Self {
        Self {
            rule,
            destination: (!accepted).then(destination),
        }
    }

    fn redirect(rule: Rule, destination: Destination) -> Self {
        Self {
            rule,
            destination: Some(destination),
        }
    }
}

/// Everything the resolver reads, borrowed from a committed state.
#[derive(Debug, Clone, Copy)]
pub struct NavigationSnapshot<'a> {
    pub path: &'a str,
    pub session: SessionStatus,
    pub step: FunnelStep,
    pub quests: &'a QuestLifecycleState,
}

impl<'a> NavigationSnapshot<'a> {
    #[must_use]
    pub const fn new(
        path: &'a str,
        session: SessionStatus,
        step: FunnelStep,
        quests: &'a QuestLifecycleState,
    ) -> Self {
        Self {
            path,
            session,
            step,
            quests,
        }
    }

    #[must_use]
    pub const fn at(self, path: &'a str) -> Self {
        Self { path, ..self }
    }
}

/// Resolver bound to the designated first quest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigator {
    first_quest_id: QuestId,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::from_config(&NavigatorConfig::default_config())
    }
}

impl Navigator {
    #[must_use]
    pub fn new(first_quest_id: impl Into<QuestId>) -> Self {
        Self {
            first_quest_id: first_quest_id.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &NavigatorConfig) -> Self {
        Self::new(config.first_quest_id.clone())
    }

    #[must_use]
    pub const fn first_quest_id(&self) -> &QuestId {
        &self.first_quest_id
    }

    /// Redirect for the snapshot, or `None` when the current path is acceptable.
    #[must_use]
    pub fn decide(&self, snapshot: &NavigationSnapshot<'_>) -> Option<Destination> {
        self.explain(snapshot)
            .and_then(|decision| decision.destination)
    }

    /// Which rule claims the snapshot. `None` while the session is hydrating or
    /// when no rule applies.
    #[must_use]
    pub fn explain(&self, snapshot: &NavigationSnapshot<'_>) -> Option<Decision> {
        if snapshot.session.is_transitional() {
            return None;
        }
        let screen = Screen::classify(snapshot.path);
        let decision = self
            .state_rules(snapshot, screen)
            .or_else(|| Self::path_rules(snapshot, screen));
        if let Some(Decision {
            rule,
            destination: Some(destination),
        }) = &decision
        {
            log::debug!(
                "{rule:?} sends {} to {}",
                snapshot.path,
                destination.href()
            );
        }
        decision
    }

    fn state_rules(&self, snapshot: &NavigationSnapshot<'_>, screen: Screen) -> Option<Decision> {
        let step = snapshot.step;
        let quests = snapshot.quests;
        let before_first_completion = step < FunnelStep::FirstQuestCompleted;
        let first = &self.first_quest_id;

        if step == FunnelStep::INITIAL {
            return Some(Decision::guard(
                Rule::FunnelEntry,
                matches!(screen, Screen::Welcome | Screen::Login),
                || Destination::to(paths::WELCOME),
            ));
        }
        if before_first_completion && quests.recent_completed_id() == Some(first) {
            return Some(Decision::guard(
                Rule::FirstQuestCompleted,
                screen == Screen::FirstQuestResult || screen.is_signup(),
                || first_quest_result("completed"),
            ));
        }
        if before_first_completion && quests.failed_id() == Some(first) {
            return Some(Decision::guard(
                Rule::FirstQuestFailed,
                screen == Screen::FirstQuestResult,
                || first_quest_result("failed"),
            ));
        }
        if let Some(pending) = quests.pending_id() {
            // Heading to the first-quest result wins over the pending quest.
            return Some(Decision::guard(
                Rule::PendingQuest,
                matches!(screen, Screen::PendingQuest | Screen::FirstQuestResult),
                || Destination::to(paths::PENDING_QUEST).with_param(QUEST_ID_PARAM, pending.as_str()),
            ));
        }
        if let Some(failed) = quests.failed_id() {
            return Some(Decision::guard(
                Rule::FailedQuest,
                matches!(screen, Screen::QuestDetail | Screen::FirstQuestResult),
                || {
                    Destination::to(paths::quest_detail_path(failed.as_str()))
                        .with_param(QUEST_ID_PARAM, failed.as_str())
                },
            ));
        }
        if step == FunnelStep::FirstQuestCompleted {
            return Some(Decision::guard(
                Rule::FirstQuestCelebrated,
                screen == Screen::FirstQuestResult || screen.is_signup(),
                || Destination::to(paths::SIGNUP_PROMPT),
            ));
        }
        if step == FunnelStep::SignupPromptShown {
            return Some(Decision::guard(
                Rule::SignupPrompt,
                screen.is_signup() || screen == Screen::Login,
                || Destination::to(paths::SIGNUP_PROMPT),
            ));
        }
        None
    }

    fn path_rules(snapshot: &NavigationSnapshot<'_>, screen: Screen) -> Option<Decision> {
        let step = snapshot.step;
        let signed_in = snapshot.session.is_signed_in();
        let finished = step.is_terminal();

        if signed_in && finished && screen.is_pre_app() {
            return Some(Decision::redirect(
                Rule::AppEntry,
                Destination::to(paths::APP_ROOT),
            ));
        }
        if !finished && !step.is_signup_in_flight() && screen == Screen::App {
            return Some(Decision::redirect(
                Rule::OnboardingGate,
                Destination::to(paths::ONBOARDING),
            ));
        }
        if screen == Screen::App && !signed_in {
            return Some(Decision::redirect(
                Rule::SessionGate,
                Destination::to(paths::LOGIN),
            ));
        }
        if screen == Screen::SignupPrompt && finished {
            // Signed-out users skip the app root, which would bounce them to login.
            let target = if signed_in { paths::APP_ROOT } else { paths::LOGIN };
            return Some(Decision::redirect(
                Rule::SignupDismissed,
                Destination::to(target),
            ));
        }
        None
    }
}

fn first_quest_result(outcome: &str) -> Destination {
    Destination::to(paths::FIRST_QUEST_RESULT).with_param(OUTCOME_PARAM, outcome)
}

/// Resolve with the default navigator configuration.
#[must_use]
pub fn decide(
    path: &str,
    session: SessionStatus,
    step: FunnelStep,
    quests: &QuestLifecycleState,
) -> Option<Destination> {
    Navigator::default().decide(&NavigationSnapshot::new(path, session, step, quests))
}
