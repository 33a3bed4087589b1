/// A row in the `subjects` table.
///
/// Subjects are reference data seeded by the initial migration and never
/// mutated at runtime.
#[derive(Debug, Clone)]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub color: String,
    pub icon: String,
}
