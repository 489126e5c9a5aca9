//! Decoding a corrupt length prefix must not reserve what the prefix claims.
//!
//! Lives in its own test binary because it installs a global allocator.

use flatcable::{decode_from_bytes, FlatcableError};
use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicUsize, Ordering};

struct LargestAlloc;

static LARGEST: AtomicUsize = AtomicUsize::new(0);

unsafe impl GlobalAlloc for LargestAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        LARGEST.fetch_max(layout.size(), Ordering::Relaxed);
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        LARGEST.fetch_max(new_size, Ordering::Relaxed);
        System.realloc(ptr, layout, new_size)
    }
}

#[global_allocator]
static GLOBAL: LargestAlloc = LargestAlloc;

#[test]
fn test_corrupt_prefix_stays_small() {
    let prefix = (1u64 << 30).to_le_bytes();
    for descriptor in ["byt", "str", "vec:byt", "set:str"] {
        let mut data = prefix.to_vec();
        if descriptor.contains(':') {
            // one element, then the corrupt payload prefix
            data = 1u64.to_le_bytes().to_vec();
            data.extend_from_slice(&prefix);
        }
        assert!(
            matches!(
                decode_from_bytes(&data, descriptor),
                Err(FlatcableError::OutOfData)
            ),
            "{}",
            descriptor
        );
    }
    let largest = LARGEST.load(Ordering::Relaxed);
    assert!(largest < 1 << 20, "largest allocation was {} bytes", largest);
}
