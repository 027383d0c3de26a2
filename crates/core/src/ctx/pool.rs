use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use indexmap::IndexSet;

use super::idpool::{FIRST_ID, IdPool};
use crate::err::Error;

#[derive(Clone, Debug)]
struct Entry<T> {
	value: T,
	/// The last frame in which this entry was used.
	epoch: u64,
}

/// What the last commit changed, kept until the next one
#[derive(Clone, Debug)]
struct Undo<T> {
	expired: Vec<(u32, Entry<T>)>,
	added: Vec<u32>,
}

/// The changes a [`Pool`] went through when a frame was committed
#[derive(Clone, Debug, PartialEq)]
pub struct PoolDiff<T> {
	/// Entries which received an id, in the order their ids were assigned.
	pub added: Vec<(u32, T)>,
	/// Ids which were released, in ascending order.
	pub expired: Vec<u32>,
}

impl<T> Default for PoolDiff<T> {
	fn default() -> Self {
		PoolDiff {
			added: Vec::new(),
			expired: Vec::new(),
		}
	}
}

impl<T> PoolDiff<T> {
	pub fn is_empty(&self) -> bool {
		self.added.is_empty() && self.expired.is_empty()
	}
}

/// A durable dictionary which maps values to ids across frames
///
/// On the writing end, every value used by a frame is touched while the frame
/// is scanned. Committing the frame expires the entries nobody touched and
/// assigns ids to the values seen for the first time. The reading end replays
/// those changes with [`Pool::expire`] and [`Pool::add`], which keeps both
/// dictionaries identical as long as frames are read in order.
#[derive(Clone, Debug)]
pub struct Pool<T> {
	ids: IdPool,
	slots: Vec<Option<Entry<T>>>,
	index: HashMap<T, u32>,
	fresh: IndexSet<T>,
	epoch: u64,
	undo: Option<Undo<T>>,
}

impl<T> Default for Pool<T> {
	fn default() -> Self {
		Pool {
			ids: IdPool::new(),
			slots: Vec::new(),
			index: HashMap::new(),
			fresh: IndexSet::new(),
			epoch: 0,
			undo: None,
		}
	}
}

fn slot_of(id: u32) -> Option<usize> {
	id.checked_sub(FIRST_ID).map(|v| v as usize)
}

impl<T: Clone + Eq + Hash> Pool<T> {
	pub fn new() -> Self {
		Self::default()
	}

	/// The number of live entries.
	pub fn len(&self) -> usize {
		self.ids.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Marks a value as used by the current frame.
	///
	/// `make` builds the owned value, and is only called the first time an
	/// unknown value is touched within a frame.
	pub fn touch<Q>(&mut self, key: &Q, make: impl FnOnce() -> T) -> bool
	where
		T: Borrow<Q>,
		Q: Hash + Eq + ?Sized,
	{
		if let Some(&id) = self.index.get(key) {
			if let Some(Some(entry)) = slot_of(id).and_then(|s| self.slots.get_mut(s)) {
				entry.epoch = self.epoch;
			}
			return false;
		}
		if self.fresh.contains(key) {
			return false;
		}
		self.fresh.insert(make());
		true
	}

	/// Ends the current frame.
	///
	/// Untouched entries are expired before fresh values are added, so the
	/// ids they free are reused by the same frame. The commit can be undone
	/// with [`revert`](Self::revert) until the next one.
	pub fn commit(&mut self) -> PoolDiff<T> {
		let epoch = self.epoch;
		let mut undo = Undo {
			expired: Vec::new(),
			added: Vec::new(),
		};
		let mut expired = Vec::new();
		for (slot, entry) in self.slots.iter_mut().enumerate() {
			if entry.as_ref().is_some_and(|e| e.epoch != epoch) {
				if let Some(entry) = entry.take() {
					let id = slot as u32 + FIRST_ID;
					self.index.remove(&entry.value);
					self.ids.release(id);
					expired.push(id);
					undo.expired.push((id, entry));
				}
			}
		}
		let fresh = std::mem::take(&mut self.fresh);
		let mut added = Vec::with_capacity(fresh.len());
		for value in fresh {
			let id = self.insert(value.clone());
			undo.added.push(id);
			added.push((id, value));
		}
		self.epoch = self.epoch.wrapping_add(1);
		self.undo = Some(undo);
		PoolDiff {
			added,
			expired,
		}
	}

	/// Undoes the last commit, for a frame which was never sent.
	///
	/// Ids, entries and the epoch are restored exactly, so the next commit
	/// assigns the same ids the reading end expects. Reverting twice, or
	/// before any commit, does nothing.
	pub fn revert(&mut self) {
		let Some(undo) = self.undo.take() else {
			return;
		};
		for id in undo.added.into_iter().rev() {
			let taken = slot_of(id).and_then(|s| self.slots.get_mut(s)).and_then(Option::take);
			if let Some(entry) = taken {
				self.index.remove(&entry.value);
			}
			self.ids.unacquire(id);
		}
		for (id, entry) in undo.expired {
			self.ids.reclaim(id);
			self.index.insert(entry.value.clone(), id);
			if let Some(slot) = slot_of(id).and_then(|s| self.slots.get_mut(s)) {
				*slot = Some(entry);
			}
		}
		self.fresh.clear();
		self.epoch = self.epoch.wrapping_sub(1);
	}

	/// Forgets the values touched since the last commit.
	///
	/// Entries which were already live keep their marker, so they survive
	/// one more commit even if the next frame does not use them.
	pub fn rollback(&mut self) {
		self.fresh.clear();
		self.undo = None;
	}

	fn insert(&mut self, value: T) -> u32 {
		let id = self.ids.acquire();
		let slot = (id - FIRST_ID) as usize;
		if self.slots.len() <= slot {
			self.slots.resize_with(slot + 1, || None);
		}
		self.index.insert(value.clone(), id);
		self.slots[slot] = Some(Entry {
			value,
			epoch: self.epoch,
		});
		id
	}

	/// Adds a value announced by the writing end, returning its id.
	pub fn add(&mut self, value: T) -> u32 {
		self.insert(value)
	}

	/// Removes the entry with the given id, as announced by the writing end.
	pub fn expire(&mut self, id: u32) -> Result<T, Error> {
		let entry = slot_of(id)
			.and_then(|s| self.slots.get_mut(s))
			.and_then(Option::take)
			.ok_or_else(|| Error::InvalidData(format!("expired id {id} is not in use")))?;
		if self.index.get(&entry.value) == Some(&id) {
			self.index.remove(&entry.value);
		}
		self.ids.release(id);
		Ok(entry.value)
	}

	/// The id of a live value.
	pub fn id_of<Q>(&self, key: &Q) -> Option<u32>
	where
		T: Borrow<Q>,
		Q: Hash + Eq + ?Sized,
	{
		self.index.get(key).copied()
	}

	/// The value of a live id.
	pub fn get(&self, id: u32) -> Option<&T> {
		slot_of(id).and_then(|s| self.slots.get(s)).and_then(Option::as_ref).map(|e| &e.value)
	}

	/// Looks up a live id, failing with `InvalidData` if it is unknown.
	pub fn resolve(&self, id: u32) -> Result<&T, Error> {
		self.get(id).ok_or_else(|| Error::InvalidData(format!("unknown dictionary id {id}")))
	}
}
