use crate::basic_types::HashMap;
use crate::engine::variables::VariableId;

/// A two-way table between names and variables.
#[derive(Debug, Default)]
pub(crate) struct VariableNames {
    names: HashMap<VariableId, String>,
    variables_by_name: HashMap<String, VariableId>,
}

impl VariableNames {
    /// Get a variable by its name.
    pub(crate) fn get_variable_by_name(&self, name: &str) -> Option<VariableId> {
        self.variables_by_name.get(name).copied()
    }

    /// Add a name to the variable. This will override the existing name if it exists.
    pub(crate) fn add(&mut self, variable: VariableId, name: String) {
        if let Some(previous) = self.names.insert(variable, name.clone()) {
            let _ = self.variables_by_name.remove(&previous);
        }
        let _ = self.variables_by_name.insert(name, variable);
    }

    pub(crate) fn remove(&mut self, variable: VariableId) -> Option<String> {
        let name = self.names.remove(&variable)?;
        let _ = self.variables_by_name.remove(&name);
        Some(name)
    }

    pub(crate) fn variables(&self) -> impl Iterator<Item = VariableId> + '_ {
        self.names.keys().copied()
    }
}
