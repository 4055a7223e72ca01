// crates/nf_field/src/field.rs

//! 场句柄
//!
//! [`Field`] / [`IntField`] 是仓库引用 + 场编号（+ 时间态）的轻量
//! 可拷贝句柄，不持有数据。数据访问返回映射后的读/写锁守卫；
//! 填充操作转发给仓库内核。

use crate::fill::FillRule;
use crate::repo::FieldRepo;
use crate::types::{FieldId, FieldRole, FieldState, IntFieldId};
use nf_foundation::MeshLocation;
use nf_mesh::PatchSet;
use parking_lot::{MappedRwLockReadGuard, MappedRwLockWriteGuard};

/// 实数场句柄（某个时间态）
#[derive(Clone, Copy)]
pub struct Field<'r> {
    repo: &'r FieldRepo,
    id: FieldId,
    state: FieldState,
}

impl<'r> Field<'r> {
    pub(crate) fn new(repo: &'r FieldRepo, id: FieldId, state: FieldState) -> Self {
        Self { repo, id, state }
    }

    pub(crate) fn id(&self) -> FieldId {
        self.id
    }

    /// 场名称
    pub fn name(&self) -> &'r str {
        &self.repo.record(self.id).info.name
    }

    /// 分量数
    pub fn ncomp(&self) -> usize {
        self.repo.record(self.id).info.ncomp
    }

    /// 鬼层宽度
    pub fn nghost(&self) -> i32 {
        self.repo.record(self.id).info.nghost
    }

    /// 保留时间态数
    pub fn nstates(&self) -> usize {
        self.repo.record(self.id).info.nstates
    }

    /// 网格位置
    pub fn location(&self) -> MeshLocation {
        self.repo.record(self.id).info.location
    }

    /// 本句柄寻址的时间态
    pub fn state(&self) -> FieldState {
        self.state
    }

    /// 同一场另一时间态的句柄；态越界 panic
    pub fn with_state(&self, state: FieldState) -> Field<'r> {
        let nstates = self.nstates();
        assert!(
            state.index() < nstates,
            "字段 '{}' 只保留 {nstates} 个时间态, 请求 {state}",
            self.name()
        );
        Field::new(self.repo, self.id, state)
    }

    /// 设定边界分类角色（须在 `apply_domain_bc` 之前）
    pub fn set_role(&self, role: FieldRole) {
        *self.repo.record(self.id).role.write() = role;
    }

    /// 当前边界分类角色
    pub fn role(&self) -> FieldRole {
        *self.repo.record(self.id).role.read()
    }

    /// 注册填充规则（覆盖声明时的默认真填充引擎）
    pub fn register_fill_patch_op(&self, rule: FillRule) {
        *self.repo.record(self.id).rule.write() = rule;
    }

    /// 当前填充规则
    pub fn fill_rule(&self) -> FillRule {
        *self.repo.record(self.id).rule.read()
    }

    /// 某层级数据的读守卫；层级未激活或槽未分配 panic
    pub fn patches(&self, lev: usize) -> MappedRwLockReadGuard<'r, PatchSet<f64>> {
        let rec = self.repo.record(self.id);
        self.repo.read_real(lev, rec.slots[self.state.index()], &rec.info.name)
    }

    /// 某层级数据的写守卫；层级未激活或槽未分配 panic
    pub fn patches_mut(&self, lev: usize) -> MappedRwLockWriteGuard<'r, PatchSet<f64>> {
        let rec = self.repo.record(self.id);
        self.repo.write_real(lev, rec.slots[self.state.index()], &rec.info.name)
    }

    /// 完整填充：层内交换 +（细层时）粗层插值 + 物理边界
    pub fn fillpatch(&self, lev: usize, time: f64) {
        self.repo.do_fillpatch(self.id, self.state, lev, time);
    }

    /// 整个区域由粗层插值构建（新建层路径），不覆盖细层数据
    pub fn fillpatch_from_coarse(&self, lev: usize, time: f64) {
        self.repo.do_fillpatch_from_coarse(self.id, self.state, lev, time);
    }

    /// 只做周期回绕和物理边界，不碰粗细界面
    pub fn fillphysbc(&self, lev: usize, time: f64) {
        self.repo.do_fillphysbc(self.id, self.state, lev, time);
    }

    /// 只刷新入流朝向的鬼层
    pub fn set_inflow(&self, lev: usize, time: f64) {
        self.repo.do_set_inflow(self.id, self.state, lev, time);
    }
}

// ============================================================================
// 整数场句柄
// ============================================================================

/// 整数场句柄（掩码/标志场，单时间态）
#[derive(Clone, Copy)]
pub struct IntField<'r> {
    repo: &'r FieldRepo,
    id: IntFieldId,
}

impl<'r> IntField<'r> {
    pub(crate) fn new(repo: &'r FieldRepo, id: IntFieldId) -> Self {
        Self { repo, id }
    }

    /// 场名称
    pub fn name(&self) -> &'r str {
        &self.repo.int_record(self.id).info.name
    }

    /// 分量数
    pub fn ncomp(&self) -> usize {
        self.repo.int_record(self.id).info.ncomp
    }

    /// 鬼层宽度
    pub fn nghost(&self) -> i32 {
        self.repo.int_record(self.id).info.nghost
    }

    /// 网格位置
    pub fn location(&self) -> MeshLocation {
        self.repo.int_record(self.id).info.location
    }

    /// 某层级数据的读守卫
    pub fn patches(&self, lev: usize) -> MappedRwLockReadGuard<'r, PatchSet<i32>> {
        let rec = self.repo.int_record(self.id);
        self.repo.read_int(lev, rec.slot, &rec.info.name)
    }

    /// 某层级数据的写守卫
    pub fn patches_mut(&self, lev: usize) -> MappedRwLockWriteGuard<'r, PatchSet<i32>> {
        let rec = self.repo.int_record(self.id);
        self.repo.write_int(lev, rec.slot, &rec.info.name)
    }
}
