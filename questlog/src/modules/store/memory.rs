use crate::{
    modules::store::{QuestStore, Result, StoreError},
    types::tables::{NewQuest, NewUser, Quest, QuestPatch, User, UserPatch},
};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;

#[derive(Default)]
struct State {
    users: Vec<User>,
    quests: Vec<Quest>,
    next_user_id: i32,
    next_quest_id: i32,
}

impl State {
    fn insert_quest(&mut self, quest: &NewQuest) -> Quest {
        self.next_quest_id += 1;
        let now = Utc::now();
        let stored = Quest {
            quest_id: self.next_quest_id,
            submission_id: quest.submission_id,
            problem_number: quest.problem_number,
            title: quest.title.clone(),
            status: quest.status.clone(),
            submitted_at: quest.submitted_at,
            run_time: quest.run_time,
            submitter: quest.submitter.clone(),
            platform: quest.platform.clone(),
            created_at: now,
            updated_at: now,
        };
        self.quests.push(stored.clone());
        stored
    }
}

/// Store kept in memory, for tests of code above the storage layer.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, user_name: &str, display_name: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.next_user_id += 1;
            let now = Utc::now();
            let user = User {
                user_id: state.next_user_id,
                user_name: user_name.to_string(),
                display_name: display_name.to_string(),
                accepted_count: 0,
                total_count: 0,
                reserved_quests: vec![],
                created_at: now,
                updated_at: now,
            };
            state.users.push(user);
        }
        self
    }

    pub fn quests(&self) -> Vec<Quest> {
        self.state.lock().unwrap().quests.clone()
    }

    pub fn user(&self, user_name: &str) -> Option<User> {
        self.state
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|user| user.user_name == user_name)
            .cloned()
    }
}

#[async_trait]
impl QuestStore for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn list_quests(&self, submitter: Option<&str>) -> Result<Vec<Quest>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .quests
            .iter()
            .filter(|quest| submitter.map_or(true, |name| quest.submitter == name))
            .cloned()
            .collect())
    }

    async fn get_quest(&self, quest_id: i32) -> Result<Option<Quest>> {
        let state = self.state.lock().unwrap();
        Ok(state.quests.iter().find(|q| q.quest_id == quest_id).cloned())
    }

    async fn create_quest(&self, quest: &NewQuest) -> Result<Quest> {
        Ok(self.state.lock().unwrap().insert_quest(quest))
    }

    async fn update_quest(&self, quest_id: i32, patch: &QuestPatch) -> Result<Option<Quest>> {
        let mut state = self.state.lock().unwrap();
        let Some(quest) = state.quests.iter_mut().find(|q| q.quest_id == quest_id) else {
            return Ok(None);
        };

        if let Some(problem_number) = patch.problem_number {
            quest.problem_number = problem_number;
        }
        if let Some(title) = &patch.title {
            quest.title = title.clone();
        }
        if let Some(status) = &patch.status {
            quest.status = status.clone();
        }
        if let Some(submitted_at) = patch.submitted_at {
            quest.submitted_at = submitted_at;
        }
        if let Some(run_time) = patch.run_time {
            quest.run_time = run_time;
        }
        if let Some(submitter) = &patch.submitter {
            quest.submitter = submitter.clone();
        }
        if let Some(platform) = &patch.platform {
            quest.platform = platform.clone();
        }
        quest.updated_at = Utc::now();

        Ok(Some(quest.clone()))
    }

    async fn delete_quest(&self, quest_id: i32) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let before = state.quests.len();
        state.quests.retain(|q| q.quest_id != quest_id);
        Ok(state.quests.len() < before)
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.state.lock().unwrap().users.clone())
    }

    async fn get_user(&self, user_id: i32) -> Result<Option<User>> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|u| u.user_id == user_id).cloned())
    }

    async fn find_user_by_name(&self, user_name: &str) -> Result<Option<User>> {
        Ok(self.user(user_name))
    }

    async fn create_user(&self, user: &NewUser) -> Result<User> {
        if self.user(&user.user_name).is_some() {
            return Err(StoreError::Conflict(format!("user {}", user.user_name)));
        }

        let mut state = self.state.lock().unwrap();
        state.next_user_id += 1;
        let now = Utc::now();
        let stored = User {
            user_id: state.next_user_id,
            user_name: user.user_name.clone(),
            display_name: user.display_name.clone(),
            accepted_count: 0,
            total_count: 0,
            reserved_quests: vec![],
            created_at: now,
            updated_at: now,
        };
        state.users.push(stored.clone());

        Ok(stored)
    }

    async fn update_user(&self, user_id: i32, patch: &UserPatch) -> Result<Option<User>> {
        let mut state = self.state.lock().unwrap();
        if let Some(user_name) = &patch.user_name {
            if state
                .users
                .iter()
                .any(|u| &u.user_name == user_name && u.user_id != user_id)
            {
                return Err(StoreError::Conflict(format!("user {}", user_name)));
            }
        }

        let Some(user) = state.users.iter_mut().find(|u| u.user_id == user_id) else {
            return Ok(None);
        };
        if let Some(user_name) = &patch.user_name {
            user.user_name = user_name.clone();
        }
        if let Some(display_name) = &patch.display_name {
            user.display_name = display_name.clone();
        }
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, user_id: i32) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let before = state.users.len();
        state.users.retain(|u| u.user_id != user_id);
        Ok(state.users.len() < before)
    }

    async fn reserve_quest(&self, user_name: &str, quest_id: i32) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let user = state
            .users
            .iter_mut()
            .find(|u| u.user_name == user_name)
            .ok_or_else(|| StoreError::NotFound(format!("user {}", user_name)))?;
        if user.reserved_quests.contains(&quest_id) {
            return Ok(false);
        }
        user.reserved_quests.push(quest_id);

        Ok(true)
    }

    async fn cancel_reservation(&self, user_name: &str, quest_id: i32) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let user = state
            .users
            .iter_mut()
            .find(|u| u.user_name == user_name)
            .ok_or_else(|| StoreError::NotFound(format!("user {}", user_name)))?;
        let before = user.reserved_quests.len();
        user.reserved_quests.retain(|id| *id != quest_id);

        Ok(user.reserved_quests.len() < before)
    }

    async fn record_sync(
        &self,
        user_name: &str,
        quests: &[NewQuest],
        accepted_count: i32,
        total_count: i32,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if !state.users.iter().any(|u| u.user_name == user_name) {
            return Err(StoreError::NotFound(format!("user {}", user_name)));
        }

        for quest in quests.iter() {
            state.insert_quest(quest);
        }
        if let Some(user) = state.users.iter_mut().find(|u| u.user_name == user_name) {
            user.accepted_count = accepted_count;
            user.total_count = total_count;
        }

        Ok(())
    }
}
