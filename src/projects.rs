//! 项目卡片的增删改

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{Project, ProjectDraft, ProjectStatus};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProjectError {
    #[error("project name is required")]
    NameRequired,
    #[error("project not found: {0}")]
    NotFound(String),
}

#[derive(Debug, Clone, Default)]
pub struct ProjectCatalog {
    projects: Vec<Project>,
}

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

fn members(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

impl ProjectCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn seeded() -> Self {
        let projects = vec![
            Project {
                id: "proj-1".to_string(),
                name: "Automação da Linha de Produção".to_string(),
                description: "Implementação de sistemas de automação para aumentar a eficiência da linha de produção principal.".to_string(),
                created_at: date(2023, 5, 15).unwrap_or_default(),
                due_date: date(2023, 12, 30),
                members: members(&["João Silva", "Maria Santos", "Carlos Oliveira"]),
                tasks_total: 24,
                tasks_completed: 10,
                status: ProjectStatus::InProgress,
            },
            Project {
                id: "proj-2".to_string(),
                name: "Certificação ISO 9001".to_string(),
                description: "Preparação e documentação para auditoria de certificação ISO 9001.".to_string(),
                created_at: date(2023, 6, 1).unwrap_or_default(),
                due_date: date(2023, 10, 15),
                members: members(&["Ana Costa", "Pedro Alves"]),
                tasks_total: 18,
                tasks_completed: 15,
                status: ProjectStatus::InProgress,
            },
            Project {
                id: "proj-3".to_string(),
                name: "Treinamento de Segurança".to_string(),
                description: "Programa de treinamentos em segurança do trabalho para todos os funcionários.".to_string(),
                created_at: date(2023, 4, 10).unwrap_or_default(),
                due_date: date(2023, 7, 20),
                members: members(&["Carlos Oliveira", "Ana Costa"]),
                tasks_total: 12,
                tasks_completed: 12,
                status: ProjectStatus::Done,
            },
        ];
        Self { projects }
    }

    pub fn all(&self) -> &[Project] {
        &self.projects
    }

    pub fn get(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// 新建项目：计数为零，状态为 "Em Andamento"，创建日期为 `today`
    pub fn create(&mut self, draft: ProjectDraft, today: NaiveDate) -> Result<String, ProjectError> {
        let name = draft.name.trim();
        if name.is_empty() {
            warn!("rejected project without name");
            return Err(ProjectError::NameRequired);
        }
        let id = format!("proj-{}", Uuid::new_v4());
        self.projects.push(Project {
            id: id.clone(),
            name: name.to_string(),
            description: draft.description,
            created_at: today,
            due_date: draft.due_date,
            members: draft.members,
            tasks_total: 0,
            tasks_completed: 0,
            status: ProjectStatus::InProgress,
        });
        info!(project_id = %id, "project created");
        Ok(id)
    }

    /// 替换可编辑字段，计数、状态和创建日期不变
    pub fn update(&mut self, id: &str, draft: ProjectDraft) -> Result<(), ProjectError> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(ProjectError::NameRequired);
        }
        let project = self
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ProjectError::NotFound(id.to_string()))?;
        project.name = name.to_string();
        project.description = draft.description;
        project.due_date = draft.due_date;
        project.members = draft.members;
        info!(project_id = id, "project updated");
        Ok(())
    }

    pub fn delete(&mut self, id: &str) -> Result<Project, ProjectError> {
        let pos = self
            .projects
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| ProjectError::NotFound(id.to_string()))?;
        info!(project_id = id, "project deleted");
        Ok(self.projects.remove(pos))
    }
}
