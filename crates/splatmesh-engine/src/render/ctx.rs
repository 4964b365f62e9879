/// Device and queue the vertex stage creates and writes its resources with.
#[derive(Copy, Clone)]
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(device: &'a wgpu::Device, queue: &'a wgpu::Queue) -> Self {
        Self { device, queue }
    }
}

impl<'a> From<&'a crate::device::HeadlessGpu> for RenderCtx<'a> {
    fn from(gpu: &'a crate::device::HeadlessGpu) -> Self {
        Self::new(gpu.device(), gpu.queue())
    }
}
