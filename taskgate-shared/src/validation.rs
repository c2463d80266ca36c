/// Task field validation
///
/// Two validators are available and one is chosen at startup:
///
/// | Rule | Lenient (`basic`) | Strict |
/// |------|-------------------|--------|
/// | title | required, non-blank, at most 200 chars | required, 5 to 200 chars |
/// | description | optional, at most 1000 chars | required, 10 to 1000 chars |
///
/// Rules are checked in a fixed order (title presence, title length,
/// description presence, description length) and only the first failure is
/// reported. Lengths count Unicode scalar values, not bytes.
///
/// # Example
///
/// ```
/// use taskgate_shared::validation::{TaskValidationError, TaskValidator};
///
/// let strict: TaskValidator = "strict".parse().unwrap();
///
/// assert_eq!(
///     strict.validate(Some("1234"), None),
///     Err(TaskValidationError::TitleTooShort { min: 5 })
/// );
/// assert!(strict.validate(Some("Título válido"), Some("Descrição longa o suficiente")).is_ok());
/// ```

use std::fmt;
use std::str::FromStr;

pub const TITLE_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;
pub const STRICT_TITLE_MIN_CHARS: usize = 5;
pub const STRICT_DESCRIPTION_MIN_CHARS: usize = 10;

/// First rule a candidate task failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskValidationError {
    #[error("Título é obrigatório")]
    TitleRequired,

    #[error("Título deve ter pelo menos {min} caracteres")]
    TitleTooShort { min: usize },

    #[error("Título não pode ter mais de {max} caracteres")]
    TitleTooLong { max: usize },

    #[error("Descrição é obrigatória")]
    DescriptionRequired,

    #[error("Descrição deve ter pelo menos {min} caracteres")]
    DescriptionTooShort { min: usize },

    #[error("Descrição não pode ter mais de {max} caracteres")]
    DescriptionTooLong { max: usize },
}

impl TaskValidationError {
    /// Name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            TaskValidationError::TitleRequired
            | TaskValidationError::TitleTooShort { .. }
            | TaskValidationError::TitleTooLong { .. } => "title",
            TaskValidationError::DescriptionRequired
            | TaskValidationError::DescriptionTooShort { .. }
            | TaskValidationError::DescriptionTooLong { .. } => "description",
        }
    }
}

/// Validation policy for task title/description
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskValidator {
    /// Title required, description optional
    #[default]
    Lenient,

    /// Minimum lengths and a mandatory description
    Strict,
}

impl TaskValidator {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskValidator::Lenient => "basic",
            TaskValidator::Strict => "strict",
        }
    }

    /// Checks a candidate title/description pair
    ///
    /// `None` and whitespace-only strings both count as missing.
    pub fn validate(
        &self,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<(), TaskValidationError> {
        let title = title.filter(|t| !t.trim().is_empty());
        let description = description.filter(|d| !d.trim().is_empty());

        let title_len = match title {
            Some(t) => t.chars().count(),
            None => return Err(TaskValidationError::TitleRequired),
        };

        match self {
            TaskValidator::Lenient => {
                if title_len > TITLE_MAX_CHARS {
                    return Err(TaskValidationError::TitleTooLong {
                        max: TITLE_MAX_CHARS,
                    });
                }

                if let Some(d) = description {
                    if d.chars().count() > DESCRIPTION_MAX_CHARS {
                        return Err(TaskValidationError::DescriptionTooLong {
                            max: DESCRIPTION_MAX_CHARS,
                        });
                    }
                }
            }
            TaskValidator::Strict => {
                if title_len < STRICT_TITLE_MIN_CHARS {
                    return Err(TaskValidationError::TitleTooShort {
                        min: STRICT_TITLE_MIN_CHARS,
                    });
                }
                if title_len > TITLE_MAX_CHARS {
                    return Err(TaskValidationError::TitleTooLong {
                        max: TITLE_MAX_CHARS,
                    });
                }

                let description_len = match description {
                    Some(d) => d.chars().count(),
                    None => return Err(TaskValidationError::DescriptionRequired),
                };
                if description_len < STRICT_DESCRIPTION_MIN_CHARS {
                    return Err(TaskValidationError::DescriptionTooShort {
                        min: STRICT_DESCRIPTION_MIN_CHARS,
                    });
                }
                if description_len > DESCRIPTION_MAX_CHARS {
                    return Err(TaskValidationError::DescriptionTooLong {
                        max: DESCRIPTION_MAX_CHARS,
                    });
                }
            }
        }

        Ok(())
    }
}

impl fmt::Display for TaskValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskValidator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" | "lenient" => Ok(TaskValidator::Lenient),
            "strict" => Ok(TaskValidator::Strict),
            other => Err(format!(
                "Unknown task validator '{}' (expected 'basic' or 'strict')",
                other
            )),
        }
    }
}
