//! Route paths known to the resolver and their classification into screens.

pub const ROOT: &str = "/";
pub const WELCOME: &str = "/welcome";
pub const LOGIN: &str = "/login";
pub const ONBOARDING: &str = "/onboarding";
pub const FIRST_QUEST_RESULT: &str = "/first-quest-result";
pub const SIGNUP_PROMPT: &str = "/signup-prompt";
pub const SIGNUP: &str = "/signup";
pub const PENDING_QUEST: &str = "/pending-quest";
pub const QUEST_DETAIL: &str = "/quest";
/// Root of the authenticated app group.
pub const APP_ROOT: &str = "/(app)";

/// Screen family a path belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Screen {
    Root,
    Welcome,
    Login,
    Onboarding,
    FirstQuestResult,
    SignupPrompt,
    Signup,
    PendingQuest,
    QuestDetail,
    App,
    Other,
}

impl Screen {
    #[must_use]
    pub fn classify(path: &str) -> Self {
        const PREFIXES: &[(&str, Screen)] = &[
            (APP_ROOT, Screen::App),
            (WELCOME, Screen::Welcome),
            (LOGIN, Screen::Login),
            (ONBOARDING, Screen::Onboarding),
            (FIRST_QUEST_RESULT, Screen::FirstQuestResult),
            (SIGNUP_PROMPT, Screen::SignupPrompt),
            (SIGNUP, Screen::Signup),
            (PENDING_QUEST, Screen::PendingQuest),
            (QUEST_DETAIL, Screen::QuestDetail),
        ];
        let path = normalize(path);
        if path == ROOT {
            return Self::Root;
        }
        PREFIXES
            .iter()
            .find(|(prefix, _)| is_under(path, prefix))
            .map_or(Self::Other, |(_, screen)| *screen)
    }

    /// Screens a signed-in user with a finished funnel is moved off of.
    #[must_use]
    pub const fn is_pre_app(self) -> bool {
        matches!(
            self,
            Self::Root
                | Self::Welcome
                | Self::Login
                | Self::Onboarding
                | Self::FirstQuestResult
                | Self::Signup
        )
    }

    #[must_use]
    pub const fn is_signup(self) -> bool {
        matches!(self, Self::SignupPrompt | Self::Signup)
    }
}

/// Strip query, fragment, and trailing slashes.
#[must_use]
pub fn normalize(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() { ROOT } else { trimmed }
}

/// Segment-aware prefix test: `/signup` covers `/signup/email` but not `/signup-prompt`.
#[must_use]
pub fn is_under(path: &str, prefix: &str) -> bool {
    let path = normalize(path);
    let prefix = normalize(prefix);
    if prefix == ROOT {
        return true;
    }
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[must_use]
pub fn is_app_path(path: &str) -> bool {
    is_under(path, APP_ROOT)
}

#[must_use]
pub fn quest_detail_path(quest_id: &str) -> String {
    format!("{QUEST_DETAIL}/{}", urlencoding::encode(quest_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_noise() {
        assert_eq!(normalize(""), "/");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize("/welcome/"), "/welcome");
        assert_eq!(normalize("/login?next=/journal#top"), "/login");
        assert_eq!(normalize("/?ref=mail"), "/");
    }

    #[test]
    fn prefix_matching_respects_segments() {
        assert!(is_under("/signup", SIGNUP));
        assert!(is_under("/signup/email", SIGNUP));
        assert!(!is_under("/signup-prompt", SIGNUP));
        assert!(is_app_path("/(app)"));
        assert!(is_app_path("/(app)/index"));
        assert!(!is_app_path("/app/index"));
        assert!(is_under("/anything", ROOT));
    }

    #[test]
    fn classifies_known_screens() {
        let cases = [
            ("/", Screen::Root),
            ("/welcome", Screen::Welcome),
            ("/welcome/character", Screen::Welcome),
            ("/login", Screen::Login),
            ("/onboarding", Screen::Onboarding),
            ("/first-quest-result?outcome=failed", Screen::FirstQuestResult),
            ("/signup-prompt", Screen::SignupPrompt),
            ("/signup", Screen::Signup),
            ("/pending-quest", Screen::PendingQuest),
            ("/quest/quest-7", Screen::QuestDetail),
            ("/(app)/index", Screen::App),
            ("/(app)/journal", Screen::App),
            ("/journal", Screen::Other),
            ("/questlog", Screen::Other),
        ];
        for (path, screen) in cases {
            assert_eq!(Screen::classify(path), screen, "{path}");
        }
    }

    #[test]
    fn pre_app_and_signup_groups() {
        assert!(Screen::Root.is_pre_app());
        assert!(!Screen::SignupPrompt.is_pre_app());
        assert!(!Screen::App.is_pre_app());
        assert!(!Screen::PendingQuest.is_pre_app());
        assert!(Screen::Signup.is_signup());
        assert!(!Screen::Login.is_signup());
        assert_eq!(quest_detail_path("q1"), "/quest/q1");
        assert_eq!(quest_detail_path("a/b?c"), "/quest/a%2Fb%3Fc");
        assert_eq!(Screen::classify(&quest_detail_path("a#b")), Screen::QuestDetail);
    }
}
