//! Runtime configuration loaded from environment variables.

use crate::error::EngineError;
use crate::prompt::Referral;
use crate::small_talk::SmallTalkPolicy;

pub const DEFAULT_SUPPORT_URL: &str = "https://classic.com.np";
pub const DEFAULT_SUPPORT_CONTACT: &str = "Classic Tech customer support";

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Snippets requested from the knowledge index.
    pub top_k: usize,
    /// Most recent turns included in the grounded prompt.
    pub history_window: usize,
    /// Byte budget of the documents block.
    pub max_ctx_chars: usize,
    pub grounded_temperature: f32,
    pub fallback_temperature: f32,
    pub small_talk: SmallTalkPolicy,
    pub referral: Referral,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            history_window: 20,
            max_ctx_chars: 8000,
            grounded_temperature: 0.7,
            fallback_temperature: 0.7,
            small_talk: SmallTalkPolicy::default(),
            referral: Referral {
                url: DEFAULT_SUPPORT_URL.into(),
                contact: DEFAULT_SUPPORT_CONTACT.into(),
            },
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, EngineError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Variables: `RAG_TOP_K`, `HISTORY_WINDOW`, `MAX_CTX_CHARS`,
    /// `GROUNDED_TEMPERATURE`, `FALLBACK_TEMPERATURE`, `SMALL_TALK_MODE`
    /// (`fuzzy` | `exact`), `SMALL_TALK_CUTOFF`, `SUPPORT_URL`, `SUPPORT_CONTACT`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, EngineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        let get = |k: &str| lookup(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let top_k: usize = parse(&get, "RAG_TOP_K", d.top_k)?;
        if top_k == 0 {
            return Err(EngineError::Config("RAG_TOP_K must be > 0".into()));
        }

        let grounded_temperature = temperature(&get, "GROUNDED_TEMPERATURE", d.grounded_temperature)?;
        let fallback_temperature = temperature(&get, "FALLBACK_TEMPERATURE", d.fallback_temperature)?;

        let mode = get("SMALL_TALK_MODE")
            .map(|m| m.to_ascii_lowercase())
            .unwrap_or_else(|| "fuzzy".into());
        let small_talk = match mode.as_str() {
            "fuzzy" => SmallTalkPolicy::Fuzzy {
                cutoff: cutoff(&get)?,
            },
            "exact" => SmallTalkPolicy::Exact,
            other => {
                return Err(EngineError::Config(format!(
                    "SMALL_TALK_MODE must be `fuzzy` or `exact`, got `{other}`"
                )));
            }
        };

        Ok(Self {
            top_k,
            history_window: parse(&get, "HISTORY_WINDOW", d.history_window)?,
            max_ctx_chars: parse(&get, "MAX_CTX_CHARS", d.max_ctx_chars)?,
            grounded_temperature,
            fallback_temperature,
            small_talk,
            referral: Referral {
                url: get("SUPPORT_URL").unwrap_or(d.referral.url),
                contact: get("SUPPORT_CONTACT").unwrap_or(d.referral.contact),
            },
        })
    }
}

fn parse<G, T>(get: &G, key: &str, dflt: T) -> Result<T, EngineError>
where
    G: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match get(key) {
        Some(v) => v
            .parse()
            .map_err(|_| EngineError::Config(format!("{key}: cannot parse `{v}`"))),
        None => Ok(dflt),
    }
}

fn temperature<G>(get: &G, key: &str, dflt: f32) -> Result<f32, EngineError>
where
    G: Fn(&str) -> Option<String>,
{
    let t: f32 = parse(get, key, dflt)?;
    if !(0.0..=2.0).contains(&t) {
        return Err(EngineError::Config(format!("{key} must be within 0.0..=2.0")));
    }
    Ok(t)
}

fn cutoff<G>(get: &G) -> Result<f64, EngineError>
where
    G: Fn(&str) -> Option<String>,
{
    let c: f64 = parse(get, "SMALL_TALK_CUTOFF", 0.8)?;
    if !(0.0..=1.0).contains(&c) {
        return Err(EngineError::Config(
            "SMALL_TALK_CUTOFF must be within 0.0..=1.0".into(),
        ));
    }
    Ok(c)
}
