use serde::{Deserialize, Serialize};

/// Tuning knobs for a fill run.
///
/// The heuristics here (confirmation hints, submit keywords, retry bounds)
/// are tuned against observed registration/verification pages; the page set
/// is unbounded, so they are configuration rather than code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillConfig {
    /// Inclusive millisecond range for the randomized pause between typed
    /// characters.
    pub typing_delay_ms: (u64, u64),
    /// Pause letting page-side rendering (e.g. a filtered dropdown) settle
    /// before the engine inspects the document again.
    pub settle_delay_ms: u64,
    /// How many times a combobox search is re-attempted after re-opening.
    pub combobox_retries: u32,
    /// Bounded retries of the submit-control search.
    pub submit_max_attempts: u32,
    /// Delay between submit-control search attempts.
    pub submit_retry_delay_ms: u64,
    /// Pause between the last filled field and a continue/verify click.
    pub post_fill_submit_delay_ms: u64,
    /// Whether the generic field flow may reach the submit routine at all.
    /// Off by default: the generic flow only fills.
    pub auto_submit_generic: bool,
    /// Semantic keys treated as the password value.
    pub password_keys: Vec<String>,
    /// Substrings of `name` identifying a password-confirmation field.
    pub confirm_name_hints: Vec<String>,
    /// Substrings of `id` identifying a password-confirmation field.
    pub confirm_id_hints: Vec<String>,
    /// Substrings of `placeholder` identifying a password-confirmation field.
    pub confirm_placeholder_hints: Vec<String>,
    /// Element ids tried first when looking for a submit-like control.
    pub explicit_submit_ids: Vec<String>,
    /// Keywords matched against a candidate control's id, value, text and
    /// aria-label.
    pub submit_keywords: Vec<String>,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            typing_delay_ms: (20, 60),
            settle_delay_ms: 120,
            combobox_retries: 1,
            submit_max_attempts: 12,
            submit_retry_delay_ms: 250,
            post_fill_submit_delay_ms: 600,
            auto_submit_generic: false,
            password_keys: vec!["password".into(), "pass".into(), "pwd".into()],
            confirm_name_hints: vec!["passwordcheck".into()],
            confirm_id_hints: vec!["ap_password_check".into()],
            confirm_placeholder_hints: vec!["confirm".into()],
            explicit_submit_ids: vec![
                "signInSubmit".into(),
                "continue".into(),
                "submit".into(),
            ],
            submit_keywords: vec![
                "continue".into(),
                "submit".into(),
                "sign in".into(),
                "signin".into(),
                "log in".into(),
                "login".into(),
                "next".into(),
                "save".into(),
                "confirm".into(),
                "proceed".into(),
            ],
        }
    }
}

impl FillConfig {
    /// A configuration with every pause zeroed, for deterministic tests.
    pub fn instant() -> Self {
        Self {
            typing_delay_ms: (0, 0),
            settle_delay_ms: 0,
            submit_retry_delay_ms: 0,
            post_fill_submit_delay_ms: 0,
            ..Self::default()
        }
    }
}
