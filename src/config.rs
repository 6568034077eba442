use std::env;

pub(crate) const SHELL_NAME: &str = "minsh";
pub(crate) const PROMPT: &str = "\x1b[1m\x1b[34mminsh\x1b[0m$ ";

pub(crate) const DEFAULT_RECALL_DEPTH: usize = 16;
pub(crate) const RECALL_DEPTH_VAR: &str = "MINSH_RECALL_DEPTH";

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Config {
    /// How many `!!` recalls may nest inside one line.
    pub(crate) max_recall_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_recall_depth: DEFAULT_RECALL_DEPTH,
        }
    }
}

impl Config {
    pub(crate) fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from defaults, overridden by whatever `lookup`
    /// returns for `MINSH_RECALL_DEPTH`.
    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(depth) = lookup(RECALL_DEPTH_VAR) {
            match depth.trim().parse::<usize>() {
                Ok(depth) if depth > 0 => config.max_recall_depth = depth,
                _ => report!(
                    "{}: expected a positive number, got {:?}; using {}",
                    RECALL_DEPTH_VAR,
                    depth,
                    DEFAULT_RECALL_DEPTH
                ),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, DEFAULT_RECALL_DEPTH, RECALL_DEPTH_VAR};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn config_from(depth: Option<&str>) -> Config {
        Config::from_lookup(|key| {
            assert_eq!(key, RECALL_DEPTH_VAR);
            depth.map(str::to_owned)
        })
    }

    #[test]
    fn test_defaults() {
        assert_eq!(
            config_from(None),
            Config {
                max_recall_depth: DEFAULT_RECALL_DEPTH,
            }
        );
    }

    #[rstest]
    #[case("3", 3)]
    #[case(" 40 ", 40)]
    #[case("0", DEFAULT_RECALL_DEPTH)]
    #[case("-2", DEFAULT_RECALL_DEPTH)]
    #[case("many", DEFAULT_RECALL_DEPTH)]
    fn test_recall_depth(#[case] value: &str, #[case] expected: usize) {
        assert_eq!(config_from(Some(value)).max_recall_depth, expected);
    }
}
