use chrono::NaiveDate;
use proptest::prelude::*;

use taskpro::board::{BoardStore, DropEvent, Location, Moved};
use taskpro::models::TaskDraft;

fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 7, 20).unwrap()
}

#[derive(Debug, Clone)]
enum Op {
    Create(String),
    Delete(usize),
    Drop {
        pick: usize,
        dest_column: usize,
        dest_index: usize,
        cancelled: bool,
    },
    Adjacent(usize, bool),
    Reorder(usize, bool),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        "[a-z ]{0,12}".prop_map(Op::Create),
        any::<usize>().prop_map(Op::Delete),
        (any::<usize>(), 0usize..3, 0usize..8, any::<bool>()).prop_map(
            |(pick, dest_column, dest_index, cancelled)| Op::Drop {
                pick,
                dest_column,
                dest_index,
                cancelled,
            }
        ),
        (any::<usize>(), any::<bool>()).prop_map(|(p, right)| Op::Adjacent(p, right)),
        (any::<usize>(), any::<bool>()).prop_map(|(p, down)| Op::Reorder(p, down)),
    ]
}

/// Picks a task by position over the board's column lists.
fn pick(store: &BoardStore, n: usize) -> Option<(String, String, usize)> {
    let board = store.board();
    let slots: Vec<(String, String, usize)> = board
        .ordered_columns()
        .flat_map(|c| {
            c.task_ids
                .iter()
                .enumerate()
                .map(move |(i, id)| (id.clone(), c.id.clone(), i))
        })
        .collect();
    if slots.is_empty() {
        return None;
    }
    slots.get(n % slots.len()).cloned()
}

fn apply(store: &mut BoardStore, op: &Op) {
    match op {
        Op::Create(title) => {
            let result = store.create_task(TaskDraft::new(title.clone(), fixed_today()));
            assert_eq!(result.is_err(), title.trim().is_empty());
        }
        Op::Delete(n) => {
            if let Some((id, _, _)) = pick(store, *n) {
                assert!(store.delete_task(&id));
                assert!(store.task(&id).is_none());
            }
        }
        Op::Drop {
            pick: n,
            dest_column,
            dest_index,
            cancelled,
        } => {
            let Some((id, column, index)) = pick(store, *n) else {
                return;
            };
            let dest = store.board().column_order[*dest_column].clone();
            let event = DropEvent::new(
                id.clone(),
                Location::new(column.clone(), index),
                (!cancelled).then(|| Location::new(dest.clone(), *dest_index)),
            );
            let moved = store.apply_drop(&event).unwrap();
            if *cancelled {
                assert_eq!(moved, Moved::Unchanged);
            }
            if !cancelled && dest != column {
                assert!(matches!(moved, Moved::Relocated { .. }));
                assert_eq!(store.column_of(&id).unwrap().id, dest);
            }
        }
        Op::Adjacent(n, right) => {
            if let Some((id, _, _)) = pick(store, *n) {
                store.move_adjacent(&id, if *right { 1 } else { -1 }).unwrap();
            }
        }
        Op::Reorder(n, down) => {
            if let Some((id, _, _)) = pick(store, *n) {
                store.reorder(&id, if *down { 1 } else { -1 }).unwrap();
            }
        }
    }
}

proptest! {
    #[test]
    fn board_stays_consistent(ops in prop::collection::vec(op(), 0..40)) {
        let mut store = BoardStore::seeded().with_clock(fixed_today);
        for op in &ops {
            apply(&mut store, op);
            prop_assert!(store.board().check_invariants().is_ok());

            // 只有完成列里的任务有完成日期
            for task in store.board().tasks.values() {
                let in_done = store.column_of(&task.id).map(|c| c.id.as_str())
                    == Some(store.completed_column());
                prop_assert_eq!(task.completed_date.is_some(), in_done);
            }
        }
    }

    #[test]
    fn moves_preserve_task_count(ops in prop::collection::vec(op(), 0..40)) {
        let mut store = BoardStore::seeded().with_clock(fixed_today);
        let mut expected = store.board().task_count();
        for op in &ops {
            let before = store.board().task_count();
            apply(&mut store, op);
            match op {
                Op::Create(title) if !title.trim().is_empty() => expected += 1,
                Op::Delete(_) if before > 0 => expected -= 1,
                _ => {}
            }
            prop_assert_eq!(store.board().task_count(), expected);
        }
    }

    #[test]
    fn drop_lands_at_clamped_index(n in any::<usize>(), dest_column in 0usize..3, dest_index in 0usize..10) {
        let mut store = BoardStore::seeded().with_clock(fixed_today);
        let (id, column, index) = pick(&store, n).unwrap();
        let dest = store.board().column_order[dest_column].clone();
        let event = DropEvent::new(
            id.clone(),
            Location::new(column, index),
            Some(Location::new(dest.clone(), dest_index)),
        );
        store.apply_drop(&event).unwrap();

        let landed = store.board().column(&dest).unwrap();
        let expected = dest_index.min(landed.len() - 1);
        prop_assert_eq!(landed.position(&id), Some(expected));
    }
}

#[test]
fn stale_drag_source_is_rejected() {
    let mut store = BoardStore::seeded();
    let event = DropEvent::new(
        "task-1",
        Location::new("column-2", 0),
        Some(Location::new("column-3", 0)),
    );
    assert!(store.apply_drop(&event).is_err());
    assert_eq!(store.column_of("task-1").unwrap().id, "column-1");
}
