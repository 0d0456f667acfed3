//! 仪表盘上的汇总数字

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::board::Board;

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

/// 逾期伪状态的标签
pub const OVERDUE_LABEL: &str = "Atrasado";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    /// (列标题, 任务数)，按看板顺序
    pub by_status: Vec<(String, usize)>,
    /// 截止日期早于今天且不在完成列中的任务数
    pub overdue: usize,
    pub completed: usize,
    /// 完成列任务占比，四舍五入
    pub completion_rate: u16,
    /// 多部门任务每个部门各算一次
    pub by_department: BTreeMap<String, usize>,
    /// `today` 所在年份每月的完成数，从一月开始
    pub completions_by_month: [u64; 12],
}

impl Summary {
    pub fn from_board(board: &Board, completed_column: &str, today: NaiveDate) -> Self {
        let mut summary = Summary {
            total: board.task_count(),
            ..Summary::default()
        };

        for column in board.ordered_columns() {
            summary.by_status.push((column.title.clone(), column.len()));
            let done = column.id == completed_column;
            for task in board.tasks_in(&column.id) {
                if done {
                    summary.completed += 1;
                }
                if board.is_overdue(&task.id, completed_column, today) {
                    summary.overdue += 1;
                }
                for dept in &task.departments {
                    *summary.by_department.entry(dept.clone()).or_default() += 1;
                }
                if let Some(date) = task.completed_date.filter(|d| d.year() == today.year()) {
                    summary.completions_by_month[date.month0() as usize] += 1;
                }
            }
        }

        if summary.total > 0 {
            summary.completion_rate =
                ((summary.completed as f64 / summary.total as f64) * 100.0).round() as u16;
        }
        summary
    }

    /// 按状态标题取数量，包括逾期伪状态
    pub fn count_for(&self, status: &str) -> usize {
        if status == OVERDUE_LABEL {
            return self.overdue;
        }
        self.by_status
            .iter()
            .find(|(title, _)| title == status)
            .map_or(0, |(_, n)| *n)
    }
}
