use chrono::NaiveDate;
use tempfile::TempDir;

use taskpro::board::BoardStore;
use taskpro::dashboard::Summary;
use taskpro::models::{Priority, TaskDraft};
use taskpro::query::{Direction, SortField, TaskQuery};
use taskpro::session::{Session, SessionError};
use taskpro::users::UserDirectory;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 8, 20).unwrap()
}

#[test]
fn user_creates_and_completes_a_task() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");
    let users = UserDirectory::seeded();

    let mut session = Session::init(&path).unwrap();
    assert!(matches!(session.require(), Err(SessionError::NotAuthenticated)));
    let me = session
        .login(&users, "joao.silva@example.com", "joao123")
        .unwrap()
        .clone();

    // 会话文件只记录身份，不含密码
    let stored = std::fs::read_to_string(&path).unwrap();
    assert!(stored.contains("joao.silva@example.com"));
    assert!(!stored.contains("joao123"));

    let mut store = BoardStore::seeded().with_clock(today);
    let mut draft = TaskDraft::new("Calibrar sensores", NaiveDate::from_ymd_opt(2023, 8, 25).unwrap())
        .with_priority(Priority::Urgent)
        .with_department("Qualidade")
        .with_assignee("João Silva");
    draft.created_by = Some(me.email.clone());
    let id = store.create_task(draft).unwrap();
    assert_eq!(store.column_of(&id).unwrap().title, "Pendente");

    store.move_adjacent(&id, 1).unwrap();
    store.move_adjacent(&id, 1).unwrap();
    assert_eq!(store.task(&id).unwrap().completed_date, Some(today()));

    let summary = Summary::from_board(store.board(), store.completed_column(), today());
    assert_eq!(summary.total, 6);
    assert_eq!(summary.completed, 2);
    assert_eq!(summary.completion_rate, 33);
    assert_eq!(summary.completions_by_month[7], 2);

    let query = TaskQuery {
        priority: Some(Priority::Urgent),
        ..TaskQuery::default()
    };
    let rows = query.apply(store.board());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status(), "Concluído");
    assert!(me.can_delete_task(rows[0].task.created_by.as_deref()));

    // 重启后仍然登录，退出后文件被删除
    let mut restored = Session::init(&path).unwrap();
    assert_eq!(restored.identity().map(|i| i.email.as_str()), Some("joao.silva@example.com"));
    restored.logout().unwrap();
    assert!(!path.exists());
    assert!(!Session::init(&path).unwrap().is_logged_in());
}

#[test]
fn non_admin_cannot_delete_seed_tasks() {
    let users = UserDirectory::seeded();
    let mut session = Session::in_memory();
    let me = session
        .login(&users, "maria.santos@example.com", "maria123")
        .unwrap()
        .clone();
    let store = BoardStore::seeded();
    let task = store.task("task-2").unwrap();
    assert!(!me.can_delete_task(task.created_by.as_deref()));

    let admin = session
        .login(&users, "carlos.oliveira@example.com", "carlos123")
        .unwrap();
    assert!(admin.can_delete_task(task.created_by.as_deref()));
}

#[test]
fn table_sort_by_title_descending() {
    let store = BoardStore::seeded();
    let mut query = TaskQuery::default();
    query.toggle_sort(SortField::Title);
    query.toggle_sort(SortField::Title);
    assert_eq!(query.direction, Direction::Desc);

    let titles: Vec<&str> = query
        .apply(store.board())
        .iter()
        .map(|row| row.task.title.as_str())
        .collect();
    let mut expected = titles.clone();
    expected.sort_by(|a, b| b.cmp(a));
    assert_eq!(titles, expected);
    assert_eq!(titles.len(), 5);
}
