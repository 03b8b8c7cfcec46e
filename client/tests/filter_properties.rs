//! Property tests for filtering and the active/completed invariant.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use std::sync::Arc;
use todo_client::api::InMemoryTodoApi;
use todo_client::{
    Filter, Task, TaskId, Theme, TodoAction, TodoEnvironment, TodoReducer, TodoState,
};
use todo_core::reducer::Reducer;
use todo_testing::test_clock;

fn env() -> TodoEnvironment {
    TodoEnvironment::new(InMemoryTodoApi::new().shared()).with_clock(Arc::new(test_clock()))
}

fn filter_strategy() -> impl Strategy<Value = Filter> {
    prop_oneof![Just(Filter::All), Just(Filter::Active), Just(Filter::Completed)]
}

/// Task sets with unique ids; a few tasks carry inconsistent flags
fn tasks_strategy() -> impl Strategy<Value = Vec<Task>> {
    prop::collection::vec(("[a-z ]{1,12}", any::<bool>(), any::<bool>()), 0..30).prop_map(
        |specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(index, (title, is_active, is_completed))| Task {
                    id: TaskId::new(index.to_string()),
                    title,
                    is_active,
                    is_completed,
                })
                .collect()
        },
    )
}

fn load(tasks: Vec<Task>, filter: Filter) -> TodoState {
    let reducer = TodoReducer::new();
    let env = env();
    let mut state = TodoState::new(Theme::Light);
    let _ = reducer.reduce(&mut state, TodoAction::LoadTasks { filter }, &env);
    let generation = state.load_generation;
    let _ = reducer.reduce(&mut state, TodoAction::TasksLoaded { generation, tasks }, &env);
    state
}

proptest! {
    #[test]
    fn filter_selects_exact_subset(tasks in tasks_strategy()) {
        let tasks: Vec<Task> = tasks.into_iter().map(Task::normalized).collect();

        prop_assert_eq!(Filter::All.apply(tasks.clone()), tasks.clone());

        let active: Vec<Task> = tasks.iter().filter(|t| t.is_active).cloned().collect();
        prop_assert_eq!(Filter::Active.apply(tasks.clone()), active);

        let completed: Vec<Task> = tasks.iter().filter(|t| t.is_completed).cloned().collect();
        prop_assert_eq!(Filter::Completed.apply(tasks), completed);
    }

    #[test]
    fn loaded_view_matches_filter_and_counts_unfiltered(
        tasks in tasks_strategy(),
        filter in filter_strategy(),
    ) {
        let expected_active = tasks
            .iter()
            .cloned()
            .map(Task::normalized)
            .filter(|t| t.is_active)
            .count();

        let state = load(tasks, filter);

        prop_assert!(state.tasks.iter().all(|t| filter.matches(t)));
        prop_assert!(state.tasks.iter().all(Task::is_consistent));
        prop_assert_eq!(state.active_count, expected_active);
        prop_assert!(!state.is_loading);
    }

    #[test]
    fn server_updates_keep_invariant(
        tasks in tasks_strategy(),
        flips in prop::collection::vec((any::<prop::sample::Index>(), any::<bool>()), 0..20),
    ) {
        let reducer = TodoReducer::new();
        let env = env();
        let mut state = load(tasks, Filter::All);

        for (index, completed) in flips {
            if state.tasks.is_empty() {
                break;
            }
            let current = state.tasks[index.index(state.tasks.len())].clone();
            let _ = reducer.reduce(
                &mut state,
                TodoAction::SetCompletion { id: current.id.clone(), completed },
                &env,
            );
            let pending = state.notifications.last().unwrap().id;
            let _ = reducer.reduce(
                &mut state,
                TodoAction::TaskUpdated {
                    notification: pending,
                    task: current.with_completion(completed),
                },
                &env,
            );

            prop_assert!(state.tasks.iter().all(Task::is_consistent));
            let active = state.tasks.iter().filter(|t| t.is_active).count();
            prop_assert_eq!(state.active_count, active);
        }
    }
}
