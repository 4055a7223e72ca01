// crates/nf_field/src/scratch.rs

//! 暂存场
//!
//! 自持存储的临时场：创建时按当前活动层级各分配一个分块集合，
//! 不进仓库名称表，随所有权释放。重划分后内部布局过期，不得
//! 跨重划分保留。

use nf_foundation::MeshLocation;
use nf_mesh::PatchSet;

/// 实数暂存场
pub struct ScratchField {
    name: String,
    location: MeshLocation,
    levels: Vec<PatchSet<f64>>,
}

impl ScratchField {
    pub(crate) fn new(name: &str, location: MeshLocation, levels: Vec<PatchSet<f64>>) -> Self {
        Self {
            name: name.to_string(),
            location,
            levels,
        }
    }

    /// 诊断用名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 网格位置
    pub fn location(&self) -> MeshLocation {
        self.location
    }

    /// 覆盖的层级数（创建时的活动层数）
    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    /// 某层级的分块集合
    pub fn level(&self, lev: usize) -> &PatchSet<f64> {
        &self.levels[lev]
    }

    /// 某层级的分块集合（可变）
    pub fn level_mut(&mut self, lev: usize) -> &mut PatchSet<f64> {
        &mut self.levels[lev]
    }
}

/// 整数暂存场
pub struct IntScratchField {
    name: String,
    location: MeshLocation,
    levels: Vec<PatchSet<i32>>,
}

impl IntScratchField {
    pub(crate) fn new(name: &str, location: MeshLocation, levels: Vec<PatchSet<i32>>) -> Self {
        Self {
            name: name.to_string(),
            location,
            levels,
        }
    }

    /// 诊断用名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 网格位置
    pub fn location(&self) -> MeshLocation {
        self.location
    }

    /// 覆盖的层级数
    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    /// 某层级的分块集合
    pub fn level(&self, lev: usize) -> &PatchSet<i32> {
        &self.levels[lev]
    }

    /// 某层级的分块集合（可变）
    pub fn level_mut(&mut self, lev: usize) -> &mut PatchSet<i32> {
        &mut self.levels[lev]
    }
}
