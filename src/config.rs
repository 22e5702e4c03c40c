//! Generation parameters

use crate::error::{DungeonError, Result};

/// Shape of the level stack and where the player and goal go
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationConfig {
    /// Number of levels in the stack
    pub level_count: usize,
    /// Level width in tiles
    pub width: usize,
    /// Level height in tiles
    pub height: usize,
    /// Random seed; `None` draws one from the OS
    pub seed: Option<u64>,
    /// Level the player spawns on
    pub start_level: usize,
    /// Level holding the goal; `None` means the last level
    pub goal_level: Option<usize>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            level_count: 5,
            width: 42,
            height: 24,
            seed: None,
            start_level: 2,
            goal_level: None,
        }
    }
}

impl GenerationConfig {
    /// Smallest grid side that still carves more than one lattice cell
    pub const MIN_SIDE: usize = 5;

    /// Stack of `level_count` levels, spawn on the first, goal on the last
    pub fn new(level_count: usize, width: usize, height: usize, seed: Option<u64>) -> Self {
        Self {
            level_count,
            width,
            height,
            seed,
            start_level: 0,
            goal_level: None,
        }
    }

    pub fn goal_level(&self) -> usize {
        self.goal_level
            .unwrap_or_else(|| self.level_count.saturating_sub(1))
    }

    pub fn validate(&self) -> Result<()> {
        if self.level_count == 0 {
            return Err(DungeonError::InvalidConfig(
                "at least one level is required".into(),
            ));
        }
        if self.width < Self::MIN_SIDE || self.height < Self::MIN_SIDE {
            return Err(DungeonError::InvalidConfig(format!(
                "levels must be at least {0}x{0}, got {1}x{2}",
                Self::MIN_SIDE,
                self.width,
                self.height
            )));
        }
        if self.start_level >= self.level_count {
            return Err(DungeonError::InvalidConfig(format!(
                "start level {} outside {} levels",
                self.start_level, self.level_count
            )));
        }
        if self.goal_level() >= self.level_count {
            return Err(DungeonError::InvalidConfig(format!(
                "goal level {} outside {} levels",
                self.goal_level(),
                self.level_count
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn default_is_valid() {
        let config = GenerationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.goal_level(), 4);
    }

    #[rstest]
    #[case(GenerationConfig::new(0, 10, 10, None))]
    #[case(GenerationConfig::new(2, 4, 10, None))]
    #[case(GenerationConfig::new(2, 10, 3, None))]
    #[case(GenerationConfig { start_level: 2, ..GenerationConfig::new(2, 10, 10, None) })]
    #[case(GenerationConfig { goal_level: Some(5), ..GenerationConfig::new(2, 10, 10, None) })]
    fn rejects_invalid(#[case] config: GenerationConfig) {
        assert!(matches!(
            config.validate(),
            Err(DungeonError::InvalidConfig(_))
        ));
    }
}
