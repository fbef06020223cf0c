use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

// Writers only replace whole values, so a poisoned lock still guards consistent data.

pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
