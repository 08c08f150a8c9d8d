use std::slice;

use crate::gl::GL;

/// Uploads an array of elements to a WebGL buffer as raw bytes.
///
/// # Safety
/// Requires that T:
/// - Has a stable memory layout (use #[repr(C)] or #[repr(transparent)])
/// - Contains only copy types
/// - Has no padding issues that would cause UB
pub(super) fn buffer_upload_array<T>(gl: &GL, target: u32, data: &[T], usage: u32) {
    unsafe {
        let data_ptr = data.as_ptr() as *const u8;
        let size = std::mem::size_of_val(data);
        let view = js_sys::Uint8Array::view(slice::from_raw_parts(data_ptr, size));
        gl.buffer_data_with_array_buffer_view(target, &view, usage);
    }
}

/// Uploads an array of elements into an existing buffer's byte range without
/// reallocating, assuming the buffer is already bound to `target`.
///
/// # Safety
/// See `buffer_upload_array`.
pub(super) fn buffer_sub_upload_array<T>(gl: &GL, target: u32, byte_offset: i32, data: &[T]) {
    unsafe {
        let data_ptr = data.as_ptr() as *const u8;
        let size = std::mem::size_of_val(data);
        let view = js_sys::Uint8Array::view(slice::from_raw_parts(data_ptr, size));
        gl.buffer_sub_data_with_i32_and_array_buffer_view(target, byte_offset, &view);
    }
}
