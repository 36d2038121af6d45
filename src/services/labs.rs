//! Labs and equipment service

use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        equipment::{CreateEquipment, Equipment, UpdateEquipment},
        lab::{CreateLab, Lab, UpdateLab},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct LabsService {
    repository: Repository,
}

impl LabsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Lab>> {
        self.repository.labs.list().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Lab> {
        self.repository.labs.get_by_id(id).await
    }

    pub async fn create(&self, data: &CreateLab) -> AppResult<Lab> {
        data.validate()?;
        self.repository.labs.create(data).await
    }

    pub async fn update(&self, id: i32, data: &UpdateLab) -> AppResult<Lab> {
        data.validate()?;
        self.repository.labs.update(id, data).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.labs.delete(id).await?;
        tracing::info!(lab_id = id, "Lab deleted");
        Ok(())
    }

    /// Equipment of a lab; fails with not-found for an unknown lab
    pub async fn list_equipment(&self, lab_id: i32) -> AppResult<Vec<Equipment>> {
        self.repository.labs.get_by_id(lab_id).await?;
        self.repository.equipment.list_by_lab(lab_id).await
    }

    pub async fn create_equipment(&self, lab_id: i32, data: &CreateEquipment) -> AppResult<Equipment> {
        data.validate()?;
        self.repository.labs.get_by_id(lab_id).await?;
        self.repository.equipment.create(lab_id, data).await
    }

    pub async fn update_equipment(&self, id: i32, data: &UpdateEquipment) -> AppResult<Equipment> {
        data.validate()?;
        self.repository.equipment.update(id, data).await
    }

    pub async fn delete_equipment(&self, id: i32) -> AppResult<()> {
        self.repository.equipment.delete(id).await
    }
}
