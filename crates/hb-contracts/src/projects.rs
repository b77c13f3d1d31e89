//! Project contract

use hb_core::error::ValidationErrors;
use hb_models::Project;

use crate::base::{Contract, ValidationResult};
use crate::rules::{ProjectNameRule, Rule};

/// Validates project attributes before create/update
#[derive(Debug, Default)]
pub struct ProjectContract;

impl ProjectContract {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_name(&self, name: &str, errors: &mut ValidationErrors) {
        if name.trim().is_empty() {
            errors.add("name", "can't be blank");
        } else if name.len() > 255 {
            errors.add("name", "is too long (maximum is 255 characters)");
        } else {
            ProjectNameRule.check("name", name, errors);
        }
    }
}

impl Contract<Project> for ProjectContract {
    fn validate(&self, entity: &Project) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        self.validate_name(&entity.name, &mut errors);

        if entity.customer_id <= 0 {
            errors.add("customer_id", "can't be blank");
        }
        if entity.project_manager_id <= 0 {
            errors.add("project_manager_id", "can't be blank");
        }

        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_project() {
        let project = Project::new(1, "Apollo 11", 2, 3);
        assert!(ProjectContract::new().validate(&project).is_ok());
    }

    #[test]
    fn test_blank_name() {
        let project = Project::new(1, "  ", 2, 3);
        let errors = ProjectContract::new().validate(&project).unwrap_err();
        assert_eq!(errors.get("name"), Some(&vec!["can't be blank".to_string()]));
    }

    #[test]
    fn test_invalid_characters() {
        let project = Project::new(1, "Apollo/11", 2, 3);
        let errors = ProjectContract::new().validate(&project).unwrap_err();
        assert!(errors.has_error("name"));
        assert!(!errors.has_error("customer_id"));
    }

    #[test]
    fn test_missing_references() {
        let project = Project::new(1, "Apollo", 0, 0);
        let errors = ProjectContract::new().validate(&project).unwrap_err();
        assert!(errors.has_error("customer_id"));
        assert!(errors.has_error("project_manager_id"));
    }
}
