//! 每次启动加载的初始数据

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::models::{Column, Priority, Task};

pub const PENDING_COLUMN: &str = "column-1";
pub const IN_PROGRESS_COLUMN: &str = "column-2";
pub const COMPLETED_COLUMN: &str = "column-3";

const SEED_CREATOR: &str = "admin@example.com";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn one(value: &str) -> BTreeSet<String> {
    BTreeSet::from([value.to_string()])
}

#[allow(clippy::too_many_arguments)]
fn task(
    id: &str,
    title: &str,
    description: &str,
    priority: Priority,
    department: &str,
    assignee: &str,
    due: NaiveDate,
    created: NaiveDate,
) -> Task {
    Task {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        priority,
        departments: one(department),
        assignees: one(assignee),
        due_date: due,
        created_at: created,
        completed_date: None,
        subtasks: Vec::new(),
        created_by: Some(SEED_CREATOR.to_string()),
    }
}

pub fn tasks() -> Vec<Task> {
    let mut monitoring = task(
        "task-3",
        "Implementar novo sistema de monitoramento",
        "Instalar e configurar o novo sistema de monitoramento em tempo real para a linha de produção",
        Priority::High,
        "Inovação",
        "Carlos Oliveira",
        date(2023, 8, 15),
        date(2023, 7, 5),
    );
    monitoring.completed_date = Some(date(2023, 8, 14));

    vec![
        task(
            "task-1",
            "Manutenção preventiva da linha 1",
            "Realizar inspeção e manutenção preventiva de rotina na linha de produção 1",
            Priority::Medium,
            "Manutenção",
            "João Silva",
            date(2023, 7, 30),
            date(2023, 7, 15),
        ),
        task(
            "task-2",
            "Auditoria de qualidade",
            "Conduzir auditoria de qualidade no processo de produção conforme procedimentos ISO",
            Priority::High,
            "Qualidade",
            "Maria Santos",
            date(2023, 7, 25),
            date(2023, 7, 10),
        ),
        monitoring,
        task(
            "task-4",
            "Treinamento de segurança",
            "Conduzir treinamento de segurança para novos funcionários da produção",
            Priority::Medium,
            "Produção",
            "Ana Costa",
            date(2023, 7, 28),
            date(2023, 7, 12),
        ),
        task(
            "task-5",
            "Revisar procedimentos de manutenção",
            "Atualizar documentação de procedimentos de manutenção preventiva e corretiva",
            Priority::Low,
            "Manutenção",
            "Pedro Alves",
            date(2023, 8, 10),
            date(2023, 7, 20),
        ),
    ]
}

pub fn columns() -> Vec<Column> {
    vec![
        Column::new(PENDING_COLUMN, "Pendente").with_tasks(["task-1", "task-5"]),
        Column::new(IN_PROGRESS_COLUMN, "Em Andamento").with_tasks(["task-2", "task-4"]),
        Column::new(COMPLETED_COLUMN, "Concluído").with_tasks(["task-3"]),
    ]
}

pub fn board() -> super::Board {
    super::Board::from_parts(columns(), tasks())
}
