//! # Uniform Binding Module
//!
//! This module defines the `UniformBinding` struct, which owns a GPU uniform buffer together
//! with the CPU copy of its contents. Writers change the CPU copy through [`UniformBinding::set`]
//! or [`UniformBinding::modify`], which only marks the binding dirty; [`UniformBinding::flush`]
//! then uploads the value once per frame, and only when something actually changed.
//!
//! ## Example
//!
//! ```ignore
//! let mut lighting = UniformBinding::new(&device, "Lighting Uniforms", LightingUniforms::default());
//! lighting.modify(|l| l.colors[0] = nalgebra_glm::vec4(1.0, 0.0, 0.0, 1.0));
//! lighting.flush(&queue); // uploads
//! lighting.flush(&queue); // no-op
//! ```
//!
//! The dirty tracking lives in [`Tracked`], which holds no GPU state.
//!
//! The buffer itself is exposed so the scene can reference it from its bind group.

/// A CPU-side value that remembers whether it changed since it was last taken for upload.
#[derive(Clone, Copy, Debug)]
pub struct Tracked<T> {
    value: T,
    dirty: bool,
}

impl<T> Tracked<T> {
    /// Starts clean: `value` is assumed to be on the GPU already.
    pub fn new(value: T) -> Self {
        Self {
            value,
            dirty: false,
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn set(&mut self, value: T) {
        self.value = value;
        self.dirty = true;
    }

    pub fn modify(&mut self, f: impl FnOnce(&mut T)) {
        f(&mut self.value);
        self.dirty = true;
    }

    /// Returns the value if it changed since the last call, and marks it clean.
    pub fn take_changed(&mut self) -> Option<&T> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(&self.value)
    }
}

/// A uniform buffer on the GPU paired with its CPU-side value.
pub struct UniformBinding<T: bytemuck::Pod> {
    /// The GPU buffer holding the uniform block, created with `UNIFORM | COPY_DST`.
    pub buffer: wgpu::Buffer,

    /// The value most recently set from the CPU, and whether the GPU has seen it.
    value: Tracked<T>,
}

impl<T: bytemuck::Pod> UniformBinding<T> {
    /// Creates the buffer initialized with `value`. The binding starts clean.
    pub fn new(device: &wgpu::Device, label: &str, value: T) -> Self {
        let buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::bytes_of(&value),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            },
        );

        Self {
            buffer,
            value: Tracked::new(value),
        }
    }

    pub fn value(&self) -> &T {
        self.value.value()
    }

    /// Replaces the CPU value and schedules an upload.
    pub fn set(&mut self, value: T) {
        self.value.set(value);
    }

    /// Edits the CPU value in place and schedules an upload.
    pub fn modify(&mut self, f: impl FnOnce(&mut T)) {
        self.value.modify(f);
    }

    /// Writes the value to the GPU if it changed since the last flush.
    ///
    /// Returns `true` when a write was queued.
    pub fn flush(&mut self, queue: &wgpu::Queue) -> bool {
        match self.value.take_changed() {
            Some(value) => {
                queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(value));
                true
            }
            None => false,
        }
    }

    /// The whole buffer as a bind group resource.
    pub fn binding_resource(&self) -> wgpu::BindingResource<'_> {
        self.buffer.as_entire_binding()
    }

    /// Size of the uniform block, used as `min_binding_size` in the bind group layout.
    pub fn binding_size() -> Option<wgpu::BufferSize> {
        wgpu::BufferSize::new(std::mem::size_of::<T>() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_clean() {
        let mut tracked = Tracked::new(1.0f32);
        assert_eq!(tracked.take_changed(), None);
        assert_eq!(*tracked.value(), 1.0);
    }

    #[test]
    fn changes_are_taken_once() {
        let mut tracked = Tracked::new([0u32; 2]);
        tracked.set([1, 2]);
        tracked.modify(|v| v[1] = 5);
        assert_eq!(tracked.take_changed(), Some(&[1, 5]));
        assert_eq!(tracked.take_changed(), None);

        tracked.modify(|_| {});
        assert_eq!(tracked.take_changed(), Some(&[1, 5]));
    }
}
