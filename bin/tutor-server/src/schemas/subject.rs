use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::Subject;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubjectsResponse {
    pub subjects: Vec<SubjectResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubjectResponse {
    pub id: String,
    pub name: String,
    pub color: String,
    pub icon: String,
}

impl Subject {
    pub fn to_response(&self) -> SubjectResponse {
        SubjectResponse {
            id: self.id.clone(),
            name: self.name.clone(),
            color: self.color.clone(),
            icon: self.icon.clone(),
        }
    }
}
