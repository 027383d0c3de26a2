/// The first id handed out by an [`IdPool`]. Ids below are reserved for
/// sentinel values on the wire.
pub const FIRST_ID: u32 = 2;

/// An allocator of small integer ids
///
/// Released ids are kept sorted in descending order, so the smallest
/// released id is always the next one reused and the id space stays dense.
#[derive(Clone, Debug)]
pub struct IdPool {
	next: u32,
	released: Vec<u32>,
}

impl Default for IdPool {
	fn default() -> Self {
		IdPool {
			next: FIRST_ID,
			released: Vec::new(),
		}
	}
}

impl IdPool {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the smallest released id, or the next unused one.
	pub fn acquire(&mut self) -> u32 {
		match self.released.pop() {
			Some(id) => id,
			None => {
				let id = self.next;
				self.next += 1;
				id
			}
		}
	}

	/// Makes an id available again.
	pub fn release(&mut self, id: u32) {
		// Descending order, the smallest id sits at the end
		let pos = self.released.partition_point(|v| *v > id);
		if self.released.get(pos) != Some(&id) {
			self.released.insert(pos, id);
		}
	}

	/// Takes back an id handed out by the latest [`acquire`](Self::acquire)
	/// calls. Ids must be returned in the reverse order they were acquired,
	/// which restores the pool exactly.
	pub fn unacquire(&mut self, id: u32) {
		if id + 1 == self.next {
			self.next = id;
		} else {
			self.release(id);
		}
	}

	/// Hands out a specific released id again.
	pub fn reclaim(&mut self, id: u32) -> bool {
		match self.released.binary_search_by(|v| id.cmp(v)) {
			Ok(pos) => {
				self.released.remove(pos);
				true
			}
			Err(_) => false,
		}
	}

	/// The number of ids currently handed out.
	pub fn len(&self) -> usize {
		(self.next - FIRST_ID) as usize - self.released.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_ids_are_dense() {
		let mut pool = IdPool::new();
		assert_eq!(pool.acquire(), 2);
		assert_eq!(pool.acquire(), 3);
		assert_eq!(pool.acquire(), 4);
		assert_eq!(pool.len(), 3);
	}

	#[test]
	fn test_smallest_released_is_reused_first() {
		let mut pool = IdPool::new();
		let ids: Vec<u32> = (0..10).map(|_| pool.acquire()).collect();
		pool.release(ids[7]);
		pool.release(ids[2]);
		pool.release(ids[5]);
		assert_eq!(pool.acquire(), ids[2]);
		assert_eq!(pool.acquire(), ids[5]);
		assert_eq!(pool.acquire(), ids[7]);
		assert_eq!(pool.acquire(), 12);
	}

	#[test]
	fn test_many_releases_grow_the_buffer() {
		let mut pool = IdPool::new();
		let ids: Vec<u32> = (0..200).map(|_| pool.acquire()).collect();
		for id in ids.iter().rev() {
			pool.release(*id);
		}
		assert!(pool.is_empty());
		let again: Vec<u32> = (0..200).map(|_| pool.acquire()).collect();
		assert_eq!(again, ids);
	}

	#[test]
	fn test_unacquire_restores_the_pool() {
		let mut pool = IdPool::new();
		let ids: Vec<u32> = (0..5).map(|_| pool.acquire()).collect();
		pool.release(ids[1]);
		pool.release(ids[3]);
		let before = pool.clone();
		let taken: Vec<u32> = (0..4).map(|_| pool.acquire()).collect();
		assert_eq!(taken, vec![3, 5, 7, 8]);
		for id in taken.into_iter().rev() {
			pool.unacquire(id);
		}
		assert_eq!(pool.next, before.next);
		assert_eq!(pool.released, before.released);
	}

	#[test]
	fn test_reclaim_takes_a_released_id() {
		let mut pool = IdPool::new();
		let ids: Vec<u32> = (0..4).map(|_| pool.acquire()).collect();
		pool.release(ids[0]);
		pool.release(ids[2]);
		assert!(pool.reclaim(ids[2]));
		assert!(!pool.reclaim(ids[1]));
		assert_eq!(pool.len(), 3);
		assert_eq!(pool.acquire(), ids[0]);
		assert_eq!(pool.acquire(), 6);
	}

	#[test]
	fn test_double_release_is_ignored() {
		let mut pool = IdPool::new();
		let id = pool.acquire();
		pool.release(id);
		pool.release(id);
		assert_eq!(pool.acquire(), id);
		assert_eq!(pool.acquire(), id + 1);
	}
}
