//! Backend endpoints used by each stage of a run.
//!
//! Production values are fixed; the struct exists so tests can point the
//! stages at a local server.

pub const LOGIN_URL: &str = "https://www.heroesgame.com/api/login";
pub const ACCOUNT_PLAY_URL: &str = "https://un0.heroesofhistorygame.com/core/api/account/play";
pub const STARTUP_URL: &str = "https://un1.heroesofhistorygame.com/game/startup";
pub const RELAY_URL: &str = "https://forgeofgames.com/api/hoh/inGameData";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub login: String,
    pub account_play: String,
    pub startup: String,
    pub relay: String,
}

impl Endpoints {
    /// All four endpoints rooted at `base`, using the same paths as production.
    /// Only meant for local test servers.
    pub fn rooted_at(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            login: format!("{}/api/login", base),
            account_play: format!("{}/core/api/account/play", base),
            startup: format!("{}/game/startup", base),
            relay: format!("{}/api/hoh/inGameData", base),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            login: LOGIN_URL.to_string(),
            account_play: ACCOUNT_PLAY_URL.to_string(),
            startup: STARTUP_URL.to_string(),
            relay: RELAY_URL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rooted_at_trims_slash() {
        let e = Endpoints::rooted_at("http://127.0.0.1:8080/");
        assert_eq!(e.login, "http://127.0.0.1:8080/api/login");
        assert_eq!(e.startup, "http://127.0.0.1:8080/game/startup");
    }
}
