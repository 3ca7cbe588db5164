//! User Pool
//!
//! A fixed set of reusable test accounts handed out to one worker at a time,
//! so tests running in parallel never log in as the same user.
//!
//! Pools are ordinary values; share one through an `Arc<UserPool>`. The
//! process-wide instance behind [`user_pool`] exists for runners that cannot
//! thread a pool through their setup, and [`reset_user_pool`] discards it.
//!
//! Allocation is guarded by an in-process mutex only. Two processes each
//! holding their own pool can hand out the same account.

use crate::config::PoolConfig;
use crate::result::{WardenError, WardenResult};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// A pre-seeded test account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolUser {
    /// Stable identifier (`user-{n}`)
    pub id: String,
    /// Login email
    pub email: String,
    /// Login password
    pub password: String,
    /// Whether a worker currently holds this user
    pub in_use: bool,
    /// Worker holding this user, if any
    pub owner: Option<String>,
}

impl PoolUser {
    fn numbered(config: &PoolConfig, n: usize) -> Self {
        Self {
            id: format!("user-{n}"),
            email: config.email_for(n),
            password: config.password.clone(),
            in_use: false,
            owner: None,
        }
    }

    fn claim(&mut self, worker_id: &str) {
        self.in_use = true;
        self.owner = Some(worker_id.to_string());
    }

    fn free(&mut self) {
        self.in_use = false;
        self.owner = None;
    }
}

/// Snapshot of pool occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStatus {
    /// Users in the pool
    pub total: usize,
    /// Users free to acquire
    pub available: usize,
    /// Users held by a worker
    pub in_use: usize,
}

/// Registry of reusable test identities.
///
/// # Example
///
/// ```
/// use warden::{PoolConfig, UserPool};
///
/// let pool = UserPool::new(PoolConfig::new().with_size(2));
/// let user = pool.acquire("worker-a").expect("pool has a free user");
/// assert_eq!(user.id, "user-1");
/// pool.release(&user.id);
/// assert_eq!(pool.status().available, 2);
/// ```
#[derive(Debug)]
pub struct UserPool {
    config: PoolConfig,
    users: Mutex<Vec<PoolUser>>,
}

impl Default for UserPool {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

impl UserPool {
    /// Build a pool of `config.size` users named after `config.email_pattern`.
    #[must_use]
    pub fn new(config: PoolConfig) -> Self {
        let users = (1..=config.size)
            .map(|n| PoolUser::numbered(&config, n))
            .collect();
        debug!(size = config.size, "user pool created");
        Self {
            config,
            users: Mutex::new(users),
        }
    }

    /// Build a pool from `WARDEN_POOL_*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment holds a malformed value.
    pub fn from_env() -> WardenResult<Self> {
        Ok(Self::new(PoolConfig::from_env()?))
    }

    /// Configuration the pool was built from
    #[must_use]
    pub const fn config(&self) -> &PoolConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, Vec<PoolUser>> {
        // a panicking test must not wedge the pool for the rest of the run
        self.users.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hand the first free user to `worker_id`.
    ///
    /// Returns `None` when every user is taken. Callers should treat that as
    /// a fatal setup failure; see [`UserPool::acquire_or_fail`].
    pub fn acquire(&self, worker_id: &str) -> Option<PoolUser> {
        let mut users = self.lock();
        let Some(user) = users.iter_mut().find(|u| !u.in_use) else {
            warn!(worker = worker_id, total = self.config.size, "user pool exhausted");
            return None;
        };
        user.claim(worker_id);
        debug!(worker = worker_id, user = %user.id, "user acquired");
        Some(user.clone())
    }

    /// Like [`UserPool::acquire`] but fails with [`WardenError::PoolExhausted`].
    ///
    /// # Errors
    ///
    /// Returns an error if no user is free.
    pub fn acquire_or_fail(&self, worker_id: &str) -> WardenResult<PoolUser> {
        self.acquire(worker_id)
            .ok_or_else(|| WardenError::PoolExhausted {
                worker: worker_id.to_string(),
                total: self.config.size,
            })
    }

    /// Acquire a user that is released when the guard drops.
    ///
    /// # Errors
    ///
    /// Returns an error if no user is free.
    pub fn acquire_guard(self: &Arc<Self>, worker_id: &str) -> WardenResult<PooledUser> {
        let user = self.acquire_or_fail(worker_id)?;
        Ok(PooledUser {
            pool: Arc::clone(self),
            user,
        })
    }

    /// Return a user to the pool. Unknown or already free ids are ignored.
    pub fn release(&self, user_id: &str) {
        let mut users = self.lock();
        match users.iter_mut().find(|u| u.id == user_id) {
            Some(user) if user.in_use => {
                debug!(user = user_id, owner = ?user.owner, "user released");
                user.free();
            }
            Some(_) => {}
            None => debug!(user = user_id, "release of unknown user ignored"),
        }
    }

    /// Release every user held by `worker_id`, returning how many were freed.
    pub fn release_by_worker(&self, worker_id: &str) -> usize {
        let mut users = self.lock();
        let mut released = 0;
        for user in users
            .iter_mut()
            .filter(|u| u.owner.as_deref() == Some(worker_id))
        {
            user.free();
            released += 1;
        }
        if released > 0 {
            info!(worker = worker_id, released, "released users held by worker");
        }
        released
    }

    /// Occupancy snapshot for diagnostics
    #[must_use]
    pub fn status(&self) -> PoolStatus {
        let users = self.lock();
        let in_use = users.iter().filter(|u| u.in_use).count();
        PoolStatus {
            total: users.len(),
            available: users.len() - in_use,
            in_use,
        }
    }

    /// Copy of every entry, in pool order
    #[must_use]
    pub fn users(&self) -> Vec<PoolUser> {
        self.lock().clone()
    }
}

/// A pool user that goes back to its pool when dropped.
#[derive(Debug)]
pub struct PooledUser {
    pool: Arc<UserPool>,
    user: PoolUser,
}

impl PooledUser {
    /// The held user
    #[must_use]
    pub const fn user(&self) -> &PoolUser {
        &self.user
    }
}

impl std::ops::Deref for PooledUser {
    type Target = PoolUser;

    fn deref(&self) -> &Self::Target {
        &self.user
    }
}

impl Drop for PooledUser {
    fn drop(&mut self) {
        self.pool.release(&self.user.id);
    }
}

static GLOBAL_POOL: Mutex<Option<Arc<UserPool>>> = Mutex::new(None);

/// Process-wide pool configured from the environment on first use.
///
/// # Errors
///
/// Returns an error if the pool has to be built and the environment is
/// malformed.
pub fn user_pool() -> WardenResult<Arc<UserPool>> {
    let mut slot = GLOBAL_POOL.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(pool) = slot.as_ref() {
        return Ok(Arc::clone(pool));
    }
    let pool = Arc::new(UserPool::from_env()?);
    *slot = Some(Arc::clone(&pool));
    Ok(pool)
}

/// Process-wide pool, built from `config` on first use.
///
/// Later calls return the existing pool and ignore `config` until
/// [`reset_user_pool`] runs.
pub fn user_pool_with(config: PoolConfig) -> Arc<UserPool> {
    let mut slot = GLOBAL_POOL.lock().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(slot.get_or_insert_with(|| Arc::new(UserPool::new(config))))
}

/// Drop the process-wide pool so the next call builds a fresh one.
pub fn reset_user_pool() {
    let mut slot = GLOBAL_POOL.lock().unwrap_or_else(PoisonError::into_inner);
    *slot = None;
}
