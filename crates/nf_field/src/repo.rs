// crates/nf_field/src/repo.rs

//! 场仓库
//!
//! [`FieldRepo`] 独占持有全部仿真状态：按声明顺序编号的场记录、
//! 每个活动层级的存储槽、层级几何与分块布局。外部只通过
//! [`Field`](crate::Field) 句柄借用数据。
//!
//! # 槽模型
//!
//! 每个场的每个时间态占一个独立存储槽；层级数据持有器按槽编号
//! 存放 `RwLock<Option<PatchSet>>`。`advance_states` 轮转场记录内
//! 的槽编号列表（新态变旧态），不搬移任何数据。层级创建前声明的
//! 场延迟分配，首次 `make_new_level_from_scratch` 一次性补齐。
//!
//! # 生命周期
//!
//! 层级必须连续：创建第 `lev` 层时 `lev` 必须等于当前活动层数，
//! 只有当前最细层可被释放。槽在层级创建时从 `None` 变 `Some`，
//! 未分配访问带场名 panic。

use crate::boundary::{classify, BcTable};
use crate::config::DomainBcConfig;
use crate::error::FieldError;
use crate::field::{Field, IntField};
use crate::fill::fillpatch::{
    fill_phys_bc_only, fill_single_level, fill_two_level, fill_two_level_siblings, set_inflow_set,
};
use crate::fill::{FillPatchConfig, FillRule, InterpScheme};
use crate::scratch::{IntScratchField, ScratchField};
use crate::types::{FieldId, FieldInfo, FieldRole, FieldState, IntFieldId, SlotId};
use glam::IVec3;
use nf_foundation::{MeshLocation, NfResult};
use nf_mesh::{LevelGeometry, Patch, PatchLayout, PatchSet};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// 实数场记录
pub(crate) struct FieldRecord {
    pub(crate) info: FieldInfo,
    /// 边界分类角色
    pub(crate) role: RwLock<FieldRole>,
    /// 每个时间态一个槽，`advance_states` 轮转
    pub(crate) slots: Vec<SlotId>,
    /// 填充规则，注册后固定
    pub(crate) rule: RwLock<FillRule>,
    /// 分类层写入的边界表
    pub(crate) table: RwLock<BcTable>,
}

/// 整数场记录（掩码/标志，单时间态）
pub(crate) struct IntFieldRecord {
    pub(crate) info: FieldInfo,
    pub(crate) slot: SlotId,
}

/// 单个活动层级的数据持有器
pub(crate) struct LevelData {
    pub(crate) geometry: LevelGeometry,
    pub(crate) layout: Arc<PatchLayout>,
    /// 按实数槽编号索引
    pub(crate) real: Vec<RwLock<Option<PatchSet<f64>>>>,
    /// 按整数槽编号索引
    pub(crate) int: Vec<RwLock<Option<PatchSet<i32>>>>,
}

impl LevelData {
    fn new_allocated(
        geometry: LevelGeometry,
        layout: Arc<PatchLayout>,
        records: &[FieldRecord],
        int_records: &[IntFieldRecord],
        num_real_slots: usize,
        num_int_slots: usize,
    ) -> Self {
        let mut real: Vec<RwLock<Option<PatchSet<f64>>>> =
            (0..num_real_slots).map(|_| RwLock::new(None)).collect();
        for rec in records {
            for &slot in &rec.slots {
                *real[slot.0].get_mut() = Some(PatchSet::new(
                    layout.clone(),
                    rec.info.ncomp,
                    rec.info.nghost,
                    rec.info.location,
                ));
            }
        }
        let mut int: Vec<RwLock<Option<PatchSet<i32>>>> =
            (0..num_int_slots).map(|_| RwLock::new(None)).collect();
        for rec in int_records {
            *int[rec.slot.0].get_mut() = Some(PatchSet::new(
                layout.clone(),
                rec.info.ncomp,
                rec.info.nghost,
                rec.info.location,
            ));
        }
        Self {
            geometry,
            layout,
            real,
            int,
        }
    }
}

// ============================================================================
// 仓库
// ============================================================================

/// 场仓库：仿真状态的唯一所有者
pub struct FieldRepo {
    level0_geometry: LevelGeometry,
    ref_ratio: i32,
    records: Vec<FieldRecord>,
    names: HashMap<String, FieldId>,
    int_records: Vec<IntFieldRecord>,
    int_names: HashMap<String, IntFieldId>,
    num_real_slots: usize,
    num_int_slots: usize,
    levels: Vec<LevelData>,
}

impl FieldRepo {
    /// 创建空仓库（尚无活动层级）
    pub fn new(level0_geometry: LevelGeometry, ref_ratio: i32) -> Self {
        debug_assert!(ref_ratio >= 2, "细化比必须 >= 2");
        Self {
            level0_geometry,
            ref_ratio,
            records: Vec::new(),
            names: HashMap::new(),
            int_records: Vec::new(),
            int_names: HashMap::new(),
            num_real_slots: 0,
            num_int_slots: 0,
            levels: Vec::new(),
        }
    }

    /// 层间细化比
    #[inline]
    pub fn ref_ratio(&self) -> i32 {
        self.ref_ratio
    }

    /// 活动层级数（= 最细层 + 1）
    #[inline]
    pub fn num_active_levels(&self) -> usize {
        self.levels.len()
    }

    /// 某层级的几何
    pub fn geometry(&self, lev: usize) -> &LevelGeometry {
        &self.level_data(lev).geometry
    }

    /// 某层级的分块布局
    pub fn layout(&self, lev: usize) -> &Arc<PatchLayout> {
        &self.level_data(lev).layout
    }

    pub(crate) fn level_data(&self, lev: usize) -> &LevelData {
        assert!(
            lev < self.levels.len(),
            "层级 {lev} 未激活 (活动层数 {})",
            self.levels.len()
        );
        &self.levels[lev]
    }

    fn geometry_for(&self, lev: usize) -> LevelGeometry {
        let mut g = self.level0_geometry.clone();
        for _ in 0..lev {
            g = g.refine(self.ref_ratio);
        }
        g
    }

    // ------------------------------------------------------------------
    // 声明
    // ------------------------------------------------------------------

    /// 声明实数场（幂等；签名不一致为致命配置错误）
    ///
    /// 层级已存在时立即在每个活动层分配存储，否则延迟到首次
    /// 建层。新声明的场默认规则为按网格位置选定的真填充引擎、
    /// 标量角色、全内部边界表。
    pub fn declare_field(
        &mut self,
        name: &str,
        ncomp: usize,
        nghost: i32,
        nstates: usize,
        location: MeshLocation,
    ) -> NfResult<Field<'_>> {
        let id = self.declare_id(name, ncomp, nghost, nstates, location)?;
        Ok(self.handle(id, FieldState::New))
    }

    fn declare_id(
        &mut self,
        name: &str,
        ncomp: usize,
        nghost: i32,
        nstates: usize,
        location: MeshLocation,
    ) -> NfResult<FieldId> {
        debug_assert!(ncomp > 0 && nstates >= 1 && nstates <= 3 && nghost >= 0);
        if let Some(&id) = self.names.get(name) {
            let info = &self.records[id.0].info;
            if info.signature_matches(ncomp, nghost, nstates, location) {
                return Ok(id);
            }
            return Err(FieldError::SignatureMismatch {
                name: name.to_string(),
                detail: info.signature_diff(ncomp, nghost, nstates, location),
            }
            .into());
        }

        let slots: Vec<SlotId> = (0..nstates)
            .map(|s| SlotId(self.num_real_slots + s))
            .collect();
        self.num_real_slots += nstates;

        // 活动层级上立即分配，否则延迟
        for level in &mut self.levels {
            for _ in 0..nstates {
                level.real.push(RwLock::new(Some(PatchSet::new(
                    level.layout.clone(),
                    ncomp,
                    nghost,
                    location,
                ))));
            }
        }

        let id = FieldId(self.records.len());
        log::debug!(
            "声明字段 '{name}': ncomp={ncomp}, nghost={nghost}, nstates={nstates}, \
             location={location}, 活动层数={}",
            self.levels.len()
        );
        self.records.push(FieldRecord {
            info: FieldInfo::new(name, ncomp, nghost, nstates, location),
            role: RwLock::new(FieldRole::Scalar),
            slots,
            rule: RwLock::new(FillRule::Patch(FillPatchConfig::default_for(location))),
            table: RwLock::new(BcTable::interior(ncomp)),
        });
        self.names.insert(name.to_string(), id);
        Ok(id)
    }

    /// 声明单元中心场
    pub fn declare_cc_field(
        &mut self,
        name: &str,
        ncomp: usize,
        nghost: i32,
        nstates: usize,
    ) -> NfResult<Field<'_>> {
        self.declare_field(name, ncomp, nghost, nstates, MeshLocation::Cell)
    }

    /// 声明节点场
    pub fn declare_nd_field(
        &mut self,
        name: &str,
        ncomp: usize,
        nghost: i32,
        nstates: usize,
    ) -> NfResult<Field<'_>> {
        self.declare_field(name, ncomp, nghost, nstates, MeshLocation::Node)
    }

    /// 声明 X 法向面场
    pub fn declare_xf_field(
        &mut self,
        name: &str,
        ncomp: usize,
        nghost: i32,
        nstates: usize,
    ) -> NfResult<Field<'_>> {
        self.declare_field(name, ncomp, nghost, nstates, MeshLocation::XFace)
    }

    /// 声明 Y 法向面场
    pub fn declare_yf_field(
        &mut self,
        name: &str,
        ncomp: usize,
        nghost: i32,
        nstates: usize,
    ) -> NfResult<Field<'_>> {
        self.declare_field(name, ncomp, nghost, nstates, MeshLocation::YFace)
    }

    /// 声明 Z 法向面场
    pub fn declare_zf_field(
        &mut self,
        name: &str,
        ncomp: usize,
        nghost: i32,
        nstates: usize,
    ) -> NfResult<Field<'_>> {
        self.declare_field(name, ncomp, nghost, nstates, MeshLocation::ZFace)
    }

    /// 声明面法向三兄弟场（X/Y/Z 错位面各一个）
    pub fn declare_face_normal_field(
        &mut self,
        names: [&str; 3],
        ncomp: usize,
        nghost: i32,
        nstates: usize,
    ) -> NfResult<[Field<'_>; 3]> {
        let ix = self.declare_id(names[0], ncomp, nghost, nstates, MeshLocation::XFace)?;
        let iy = self.declare_id(names[1], ncomp, nghost, nstates, MeshLocation::YFace)?;
        let iz = self.declare_id(names[2], ncomp, nghost, nstates, MeshLocation::ZFace)?;
        Ok([
            self.handle(ix, FieldState::New),
            self.handle(iy, FieldState::New),
            self.handle(iz, FieldState::New),
        ])
    }

    /// 声明整数场（掩码/标志，单时间态，分段常数插值）
    pub fn declare_int_field(
        &mut self,
        name: &str,
        ncomp: usize,
        nghost: i32,
        location: MeshLocation,
    ) -> NfResult<IntField<'_>> {
        if let Some(&id) = self.int_names.get(name) {
            let info = &self.int_records[id.0].info;
            if info.signature_matches(ncomp, nghost, 1, location) {
                return Ok(IntField::new(self, id));
            }
            return Err(FieldError::SignatureMismatch {
                name: name.to_string(),
                detail: info.signature_diff(ncomp, nghost, 1, location),
            }
            .into());
        }
        let slot = SlotId(self.num_int_slots);
        self.num_int_slots += 1;
        for level in &mut self.levels {
            level.int.push(RwLock::new(Some(PatchSet::new(
                level.layout.clone(),
                ncomp,
                nghost,
                location,
            ))));
        }
        let id = IntFieldId(self.int_records.len());
        log::debug!("声明整数字段 '{name}': ncomp={ncomp}, nghost={nghost}, location={location}");
        self.int_records.push(IntFieldRecord {
            info: FieldInfo::new(name, ncomp, nghost, 1, location),
            slot,
        });
        self.int_names.insert(name.to_string(), id);
        Ok(IntField::new(self, id))
    }

    // ------------------------------------------------------------------
    // 查找
    // ------------------------------------------------------------------

    /// 按名称取场句柄（最新态）；未知名称 panic
    pub fn get_field(&self, name: &str) -> Field<'_> {
        self.get_field_state(name, FieldState::New)
    }

    /// 按名称和时间态取场句柄；未知名称或态越界 panic
    pub fn get_field_state(&self, name: &str, state: FieldState) -> Field<'_> {
        let Some(&id) = self.names.get(name) else {
            panic!("未知字段: '{name}'");
        };
        let nstates = self.records[id.0].info.nstates;
        assert!(
            state.index() < nstates,
            "字段 '{name}' 只保留 {nstates} 个时间态, 请求 {state}"
        );
        self.handle(id, state)
    }

    /// 场是否已声明
    pub fn field_exists(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// 按名称取整数场句柄；未知名称 panic
    pub fn get_int_field(&self, name: &str) -> IntField<'_> {
        let Some(&id) = self.int_names.get(name) else {
            panic!("未知整数字段: '{name}'");
        };
        IntField::new(self, id)
    }

    /// 整数场是否已声明
    pub fn int_field_exists(&self, name: &str) -> bool {
        self.int_names.contains_key(name)
    }

    /// 按声明顺序枚举实数场签名（外部 I/O 的稳定遍历面）
    pub fn fields(&self) -> impl Iterator<Item = &FieldInfo> {
        self.records.iter().map(|r| &r.info)
    }

    /// 按声明顺序枚举整数场签名
    pub fn int_fields(&self) -> impl Iterator<Item = &FieldInfo> {
        self.int_records.iter().map(|r| &r.info)
    }

    fn handle(&self, id: FieldId, state: FieldState) -> Field<'_> {
        Field::new(self, id, state)
    }

    pub(crate) fn record(&self, id: FieldId) -> &FieldRecord {
        &self.records[id.0]
    }

    pub(crate) fn int_record(&self, id: IntFieldId) -> &IntFieldRecord {
        &self.int_records[id.0]
    }

    // ------------------------------------------------------------------
    // 暂存场
    // ------------------------------------------------------------------

    /// 创建暂存场：自持存储，每个活动层级一个分块集合
    ///
    /// 不进名称表，不跨重划分保留。
    pub fn create_scratch_field(
        &self,
        name: &str,
        ncomp: usize,
        nghost: i32,
        location: MeshLocation,
    ) -> ScratchField {
        let levels = self
            .levels
            .iter()
            .map(|l| PatchSet::new(l.layout.clone(), ncomp, nghost, location))
            .collect();
        ScratchField::new(name, location, levels)
    }

    /// [`FieldRepo::create_scratch_field`] 的别名（无独立设备后端）
    pub fn create_scratch_field_on_host(
        &self,
        name: &str,
        ncomp: usize,
        nghost: i32,
        location: MeshLocation,
    ) -> ScratchField {
        self.create_scratch_field(name, ncomp, nghost, location)
    }

    /// 创建整数暂存场
    pub fn create_int_scratch_field(
        &self,
        name: &str,
        ncomp: usize,
        nghost: i32,
        location: MeshLocation,
    ) -> IntScratchField {
        let levels = self
            .levels
            .iter()
            .map(|l| PatchSet::new(l.layout.clone(), ncomp, nghost, location))
            .collect();
        IntScratchField::new(name, location, levels)
    }

    // ------------------------------------------------------------------
    // 边界配置
    // ------------------------------------------------------------------

    /// 用域边界配置为全部实数场分类边界表
    ///
    /// 先校验配置与周期性一致，再按每个场的角色翻译语义边界。
    pub fn apply_domain_bc(&self, cfg: &DomainBcConfig) -> NfResult<()> {
        cfg.validate(self.level0_geometry.periodic())
            .map_err(nf_foundation::NfError::from)?;
        for rec in &self.records {
            let specs = cfg.face_specs(&rec.info.name, &self.level0_geometry)?;
            let role = *rec.role.read();
            let table = classify(&rec.info.name, role, rec.info.ncomp, &specs)?;
            *rec.table.write() = table;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // 网格生命周期
    // ------------------------------------------------------------------

    /// 从零建层：分配每个已声明槽（零初始化）
    pub fn make_new_level_from_scratch(&mut self, lev: usize, _time: f64, layout: PatchLayout) {
        assert_eq!(
            lev,
            self.levels.len(),
            "层级必须连续创建: 请求 {lev}, 活动层数 {}",
            self.levels.len()
        );
        let layout = Arc::new(layout);
        log::debug!("从零创建层级 {lev}: {} 个分块", layout.num_patches());
        self.levels.push(LevelData::new_allocated(
            self.geometry_for(lev),
            layout,
            &self.records,
            &self.int_records,
            self.num_real_slots,
            self.num_int_slots,
        ));
    }

    /// 从粗层建层：分配后每个场沿填充规则的粗到细路径填满
    pub fn make_new_level_from_coarse(&mut self, lev: usize, time: f64, layout: PatchLayout) {
        assert!(lev > 0, "层级 0 没有粗层来源");
        self.make_new_level_from_scratch(lev, time, layout);
        log::debug!("层级 {lev} 由粗层数据填充");

        for rec in &self.records {
            let rule = *rec.rule.read();
            let table = rec.table.read();
            for &slot in &rec.slots {
                match rule {
                    FillRule::Null => {}
                    FillRule::ConstScalar(v) => {
                        self.with_real_mut(lev, slot, &rec.info.name, |set| set.fill_all(v));
                    }
                    FillRule::Patch(cfg) => {
                        let coarse = self.read_real(lev - 1, slot, &rec.info.name);
                        self.with_real_mut(lev, slot, &rec.info.name, |set| {
                            fill_two_level(
                                set,
                                &self.levels[lev].geometry,
                                &coarse,
                                &self.levels[lev - 1].geometry,
                                &table,
                                time,
                                cfg.interp,
                                self.ref_ratio,
                                false,
                            );
                        });
                    }
                }
            }
        }
        for rec in &self.int_records {
            let coarse = self.read_int(lev - 1, rec.slot, &rec.info.name);
            self.with_int_mut(lev, rec.slot, &rec.info.name, |set| {
                interp_int_injection(set, &coarse, self.ref_ratio);
            });
        }
    }

    /// 重划分层级：粗层插值打底，旧有效数据在交叠区按位拷回，
    /// 最后应用物理边界
    pub fn remake_level(&mut self, lev: usize, time: f64, layout: PatchLayout) {
        assert!(lev < self.levels.len(), "重划分的层级 {lev} 未激活");
        let layout = Arc::new(layout);
        log::debug!("重划分层级 {lev}: {} 个分块", layout.num_patches());
        let fresh = LevelData::new_allocated(
            self.geometry_for(lev),
            layout,
            &self.records,
            &self.int_records,
            self.num_real_slots,
            self.num_int_slots,
        );
        let old = std::mem::replace(&mut self.levels[lev], fresh);
        let geom = self.levels[lev].geometry.clone();

        for rec in &self.records {
            let rule = *rec.rule.read();
            let table = rec.table.read();
            for &slot in &rec.slots {
                let old_set = old.real[slot.0].read();
                let old_set = old_set.as_ref().expect("旧层级槽必已分配");
                match rule {
                    FillRule::Null => {
                        self.with_real_mut(lev, slot, &rec.info.name, |set| {
                            overlay_from(set, old_set, &geom);
                        });
                    }
                    FillRule::ConstScalar(v) => {
                        self.with_real_mut(lev, slot, &rec.info.name, |set| set.fill_all(v));
                    }
                    FillRule::Patch(cfg) => {
                        if lev > 0 {
                            let coarse = self.read_real(lev - 1, slot, &rec.info.name);
                            self.with_real_mut(lev, slot, &rec.info.name, |set| {
                                fill_two_level(
                                    set,
                                    &geom,
                                    &coarse,
                                    &self.levels[lev - 1].geometry,
                                    &table,
                                    time,
                                    cfg.interp,
                                    self.ref_ratio,
                                    false,
                                );
                            });
                        }
                        self.with_real_mut(lev, slot, &rec.info.name, |set| {
                            overlay_from(set, old_set, &geom);
                            fill_phys_bc_only(set, &geom, &table, time);
                        });
                    }
                }
            }
        }
        for rec in &self.int_records {
            let old_set = old.int[rec.slot.0].read();
            let old_set = old_set.as_ref().expect("旧层级槽必已分配");
            if lev > 0 {
                let coarse = self.read_int(lev - 1, rec.slot, &rec.info.name);
                self.with_int_mut(lev, rec.slot, &rec.info.name, |set| {
                    interp_int_injection(set, &coarse, self.ref_ratio);
                });
            }
            self.with_int_mut(lev, rec.slot, &rec.info.name, |set| {
                overlay_from(set, old_set, &geom);
            });
        }
    }

    /// 释放当前最细层级
    pub fn clear_level(&mut self, lev: usize) {
        assert_eq!(
            lev + 1,
            self.levels.len(),
            "只能释放当前最细层级 {} (请求 {lev})",
            self.levels.len().saturating_sub(1)
        );
        log::debug!("释放层级 {lev}");
        self.levels.pop();
    }

    /// 时间态推进：轮转每个多态场的槽编号列表（新态变旧态）
    ///
    /// 单态场不受影响；不搬移任何数据。
    pub fn advance_states(&mut self) {
        for rec in &mut self.records {
            if rec.slots.len() > 1 {
                rec.slots.rotate_right(1);
            }
        }
    }

    // ------------------------------------------------------------------
    // 槽访问
    // ------------------------------------------------------------------

    /// 读锁映射到已分配的分块集合；未分配带场名 panic
    pub(crate) fn read_real(
        &self,
        lev: usize,
        slot: SlotId,
        name: &str,
    ) -> parking_lot::MappedRwLockReadGuard<'_, PatchSet<f64>> {
        let guard = self.level_data(lev).real[slot.0].read();
        parking_lot::RwLockReadGuard::map(guard, |opt| match opt.as_ref() {
            Some(set) => set,
            None => panic!("字段 '{name}' 在层级 {lev} 未分配"),
        })
    }

    /// 写锁映射到已分配的分块集合；未分配带场名 panic
    pub(crate) fn write_real(
        &self,
        lev: usize,
        slot: SlotId,
        name: &str,
    ) -> parking_lot::MappedRwLockWriteGuard<'_, PatchSet<f64>> {
        let guard = self.level_data(lev).real[slot.0].write();
        parking_lot::RwLockWriteGuard::map(guard, |opt| match opt.as_mut() {
            Some(set) => set,
            None => panic!("字段 '{name}' 在层级 {lev} 未分配"),
        })
    }

    pub(crate) fn read_int(
        &self,
        lev: usize,
        slot: SlotId,
        name: &str,
    ) -> parking_lot::MappedRwLockReadGuard<'_, PatchSet<i32>> {
        let guard = self.level_data(lev).int[slot.0].read();
        parking_lot::RwLockReadGuard::map(guard, |opt| match opt.as_ref() {
            Some(set) => set,
            None => panic!("整数字段 '{name}' 在层级 {lev} 未分配"),
        })
    }

    pub(crate) fn write_int(
        &self,
        lev: usize,
        slot: SlotId,
        name: &str,
    ) -> parking_lot::MappedRwLockWriteGuard<'_, PatchSet<i32>> {
        let guard = self.level_data(lev).int[slot.0].write();
        parking_lot::RwLockWriteGuard::map(guard, |opt| match opt.as_mut() {
            Some(set) => set,
            None => panic!("整数字段 '{name}' 在层级 {lev} 未分配"),
        })
    }

    fn with_real_mut<R>(
        &self,
        lev: usize,
        slot: SlotId,
        name: &str,
        f: impl FnOnce(&mut PatchSet<f64>) -> R,
    ) -> R {
        let mut guard = self.write_real(lev, slot, name);
        f(&mut guard)
    }

    fn with_int_mut<R>(
        &self,
        lev: usize,
        slot: SlotId,
        name: &str,
        f: impl FnOnce(&mut PatchSet<i32>) -> R,
    ) -> R {
        let mut guard = self.write_int(lev, slot, name);
        f(&mut guard)
    }

    // ------------------------------------------------------------------
    // 填充操作（由场句柄转发）
    // ------------------------------------------------------------------

    pub(crate) fn do_fillpatch(&self, id: FieldId, state: FieldState, lev: usize, time: f64) {
        let rec = self.record(id);
        let slot = rec.slots[state.index()];
        let rule = *rec.rule.read();
        match rule {
            FillRule::Null => {}
            FillRule::ConstScalar(v) => {
                self.with_real_mut(lev, slot, &rec.info.name, |set| set.fill_all(v));
            }
            FillRule::Patch(cfg) => {
                let table = rec.table.read();
                let geom = &self.level_data(lev).geometry;
                if lev == 0 {
                    let mut set = self.write_real(lev, slot, &rec.info.name);
                    fill_single_level(&mut set, geom, &table, time);
                } else {
                    let coarse = self.read_real(lev - 1, slot, &rec.info.name);
                    let mut set = self.write_real(lev, slot, &rec.info.name);
                    fill_two_level(
                        &mut set,
                        geom,
                        &coarse,
                        &self.level_data(lev - 1).geometry,
                        &table,
                        time,
                        cfg.interp,
                        self.ref_ratio,
                        true,
                    );
                }
            }
        }
    }

    pub(crate) fn do_fillpatch_from_coarse(
        &self,
        id: FieldId,
        state: FieldState,
        lev: usize,
        time: f64,
    ) {
        assert!(lev > 0, "层级 0 没有粗层来源");
        let rec = self.record(id);
        let slot = rec.slots[state.index()];
        let rule = *rec.rule.read();
        match rule {
            FillRule::Null => {}
            FillRule::ConstScalar(v) => {
                self.with_real_mut(lev, slot, &rec.info.name, |set| set.fill_all(v));
            }
            FillRule::Patch(cfg) => {
                let table = rec.table.read();
                let coarse = self.read_real(lev - 1, slot, &rec.info.name);
                let mut set = self.write_real(lev, slot, &rec.info.name);
                fill_two_level(
                    &mut set,
                    &self.level_data(lev).geometry,
                    &coarse,
                    &self.level_data(lev - 1).geometry,
                    &table,
                    time,
                    cfg.interp,
                    self.ref_ratio,
                    false,
                );
            }
        }
    }

    pub(crate) fn do_fillphysbc(&self, id: FieldId, state: FieldState, lev: usize, time: f64) {
        let rec = self.record(id);
        let slot = rec.slots[state.index()];
        let rule = *rec.rule.read();
        match rule {
            FillRule::Null => {}
            FillRule::ConstScalar(v) => {
                self.with_real_mut(lev, slot, &rec.info.name, |set| set.fill_all(v));
            }
            FillRule::Patch(_) => {
                let table = rec.table.read();
                let mut set = self.write_real(lev, slot, &rec.info.name);
                fill_phys_bc_only(&mut set, &self.level_data(lev).geometry, &table, time);
            }
        }
    }

    pub(crate) fn do_set_inflow(&self, id: FieldId, state: FieldState, lev: usize, time: f64) {
        let rec = self.record(id);
        let slot = rec.slots[state.index()];
        let rule = *rec.rule.read();
        match rule {
            FillRule::Null => {}
            FillRule::ConstScalar(_) => {
                panic!("字段 '{}' 的常数填充规则不支持入流刷新", rec.info.name)
            }
            FillRule::Patch(_) => {
                let table = rec.table.read();
                let mut set = self.write_real(lev, slot, &rec.info.name);
                set_inflow_set(&mut set, &self.level_data(lev).geometry, &table, time);
            }
        }
    }

    /// 面法向三兄弟场的联合填充
    ///
    /// 三个场必须依次落在 X/Y/Z 法向面上且鬼层宽度一致。缺省用
    /// 散度保持插值（细化比 2），可用 `interp_override` 换成普通
    /// 算子。
    pub fn fillpatch_sibling_fields(
        &self,
        lev: usize,
        time: f64,
        names: [&str; 3],
        interp_override: Option<InterpScheme>,
    ) {
        let fields = names.map(|n| self.get_field(n));
        let recs = fields.map(|f| self.record(f.id()));
        let expected = [MeshLocation::XFace, MeshLocation::YFace, MeshLocation::ZFace];
        for (rec, loc) in recs.iter().zip(expected) {
            assert_eq!(
                rec.info.location, loc,
                "兄弟场 '{}' 的网格位置 {} 不是 {loc}",
                rec.info.name, rec.info.location
            );
        }
        assert!(
            recs[1].info.nghost == recs[0].info.nghost
                && recs[2].info.nghost == recs[0].info.nghost,
            "兄弟场的鬼层宽度必须一致"
        );
        let interp = interp_override.unwrap_or(InterpScheme::FaceDivFree);
        let tables = [
            recs[0].table.read(),
            recs[1].table.read(),
            recs[2].table.read(),
        ];
        let slots = recs.map(|r| r.slots[FieldState::New.index()]);

        if lev == 0 {
            let geom = &self.level_data(0).geometry;
            for a in 0..3 {
                let mut set = self.write_real(0, slots[a], &recs[a].info.name);
                fill_single_level(&mut set, geom, &tables[a], time);
            }
            return;
        }

        let coarse = [
            self.read_real(lev - 1, slots[0], &recs[0].info.name),
            self.read_real(lev - 1, slots[1], &recs[1].info.name),
            self.read_real(lev - 1, slots[2], &recs[2].info.name),
        ];
        let mut fx = self.write_real(lev, slots[0], &recs[0].info.name);
        let mut fy = self.write_real(lev, slots[1], &recs[1].info.name);
        let mut fz = self.write_real(lev, slots[2], &recs[2].info.name);
        fill_two_level_siblings(
            [&mut fx, &mut fy, &mut fz],
            &self.level_data(lev).geometry,
            [&coarse[0], &coarse[1], &coarse[2]],
            &self.level_data(lev - 1).geometry,
            [&tables[0], &tables[1], &tables[2]],
            time,
            interp,
            self.ref_ratio,
        );
    }
}

// ============================================================================
// 内部辅助
// ============================================================================

/// 把源集合的有效数据（含周期镜像）拷入目标集合的交叠区
///
/// 源和目标的分块布局可以不同（重划分路径）。
fn overlay_from<T: Copy + Default>(dst: &mut PatchSet<T>, src: &PatchSet<T>, geom: &LevelGeometry) {
    let mut shifts = vec![IVec3::ZERO];
    shifts.extend(geom.periodic_shifts());
    for i in 0..dst.num_patches() {
        let dst_bounds = dst.patch(i).bounds();
        for &shift in &shifts {
            for j in 0..src.num_patches() {
                let src_valid = src.valid_region(j).shift(shift);
                let Some(region) = dst_bounds.intersect(&src_valid) else {
                    continue;
                };
                let data = src.patch(j).extract(&region.shift(-shift));
                dst.patch_mut(i).paste(&region, &data);
            }
        }
    }
}

/// 整数场的分段常数注入（掩码场的固定粗到细规则）
///
/// 只填有效区；合法嵌套下粗层有效区必覆盖细层有效区粗化后的
/// 范围，鬼层留给调用方的交换/覆盖。
fn interp_int_injection(fine: &mut PatchSet<i32>, coarse: &PatchSet<i32>, ratio: i32) {
    let ncomp = fine.ncomp();
    for i in 0..fine.num_patches() {
        let region = fine.valid_region(i);
        let need = region.coarsen(ratio);
        let mut tmp = Patch::<i32>::new(need, ncomp);
        for j in 0..coarse.num_patches() {
            if let Some(r) = need.intersect(&coarse.valid_region(j)) {
                tmp.copy_region(coarse.patch(j), &r);
            }
        }
        let dst = fine.patch_mut(i);
        for comp in 0..ncomp {
            for iv in region.iter() {
                let k = IVec3::new(
                    iv.x.div_euclid(ratio),
                    iv.y.div_euclid(ratio),
                    iv.z.div_euclid(ratio),
                );
                dst.set(iv, comp, tmp.get(k, comp));
            }
        }
    }
}
