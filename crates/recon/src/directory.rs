use std::collections::BTreeMap;

/// Id → display-name lookup for employees, built once per run and never
/// mutated afterwards. Unknown ids resolve to a placeholder rather than
/// erroring.
#[derive(Debug, Clone, Default)]
pub struct EmployeeDirectory {
    names: BTreeMap<String, String>,
}

impl EmployeeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, name: impl Into<String>) {
        self.names.insert(id.into(), name.into());
    }

    pub fn get_name(&self, employee_id: &str) -> String {
        match self.names.get(employee_id) {
            Some(name) => name.clone(),
            None => format!("EMPLOYEE-{employee_id}"),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(String, String)> for EmployeeDirectory {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

/// Field/block id → division id. Scan rows carry the field they were
/// recorded in; the division is resolved by this join. Unmapped fields
/// fall through to the raw field id so a gap in the mapping never drops
/// data.
#[derive(Debug, Clone, Default)]
pub struct DivisionMap {
    by_field: BTreeMap<String, String>,
}

impl DivisionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, division: impl Into<String>) {
        self.by_field.insert(field.into(), division.into());
    }

    pub fn division_for(&self, field: &str) -> String {
        match self.by_field.get(field) {
            Some(division) => division.clone(),
            None => field.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.by_field.is_empty()
    }
}

impl FromIterator<(String, String)> for DivisionMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            by_field: iter.into_iter().collect(),
        }
    }
}
