//! Capability traits shared by every entity of the remessa graph.

use crate::validation::ValidationErrors;

/// Self-validation. Implementors append to `errors` and never stop early.
pub trait Validate {
    fn validate_into(&self, errors: &mut ValidationErrors);

    fn errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        self.validate_into(&mut errors);
        errors
    }

    fn is_valid(&self) -> bool {
        self.errors().is_empty()
    }
}
