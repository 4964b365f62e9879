use std::borrow::Cow;

use super::SplatShaderConfig;

/// Text of a fragment: fixed, or rendered from the configuration.
#[derive(Copy, Clone)]
pub enum FragmentBody {
    Static(&'static str),
    Generated(fn(&SplatShaderConfig) -> String),
}

/// A named piece of program text, emitted only when its predicate holds.
#[derive(Copy, Clone)]
pub struct ShaderFragment {
    pub name: &'static str,
    pub predicate: fn(&SplatShaderConfig) -> bool,
    pub body: FragmentBody,
}

impl ShaderFragment {
    pub const fn fixed(
        name: &'static str,
        predicate: fn(&SplatShaderConfig) -> bool,
        text: &'static str,
    ) -> Self {
        Self { name, predicate, body: FragmentBody::Static(text) }
    }

    pub const fn generated(
        name: &'static str,
        predicate: fn(&SplatShaderConfig) -> bool,
        render: fn(&SplatShaderConfig) -> String,
    ) -> Self {
        Self { name, predicate, body: FragmentBody::Generated(render) }
    }

    #[inline]
    pub fn is_active(&self, config: &SplatShaderConfig) -> bool {
        (self.predicate)(config)
    }

    pub fn render(&self, config: &SplatShaderConfig) -> Cow<'static, str> {
        match self.body {
            FragmentBody::Static(text) => Cow::Borrowed(text),
            FragmentBody::Generated(render) => Cow::Owned(render(config)),
        }
    }
}

impl std::fmt::Debug for ShaderFragment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderFragment").field("name", &self.name).finish_non_exhaustive()
    }
}
