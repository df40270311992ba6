//! 规范记录构建器。
//!
//! 每个平台把多个来源（meta 标签、结构化数据、内嵌状态、嵌入页）各自提取成一个字段包，
//! 再按来源的先后顺序合并：对每个标量字段，第一个给出非空值的来源获胜，
//! 后面的来源永远不会覆盖已经填充的字段。

pub mod audio;
pub mod pin;
pub mod post;
pub mod video;

/// 判断一个字段是否"为空"。
pub(crate) trait Blank {
    fn is_blank(&self) -> bool;
}

impl Blank for String {
    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

impl Blank for u64 {
    fn is_blank(&self) -> bool {
        *self == 0
    }
}

impl<T> Blank for Vec<T> {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

/// 仅当 `slot` 为空且 `candidate` 非空时写入。
pub(crate) fn fill<T: Blank>(slot: &mut T, candidate: T) {
    if slot.is_blank() && !candidate.is_blank() {
        *slot = candidate;
    }
}

/// 可以按"首个非空值优先"策略合并的一组字段。
pub trait FieldBag: Default {
    /// 把优先级更低的 `later` 合并进来。
    fn absorb(&mut self, later: Self);
}

/// 按给定顺序合并多个字段包，排在前面的优先。
pub fn merge_bags<B: FieldBag>(bags: impl IntoIterator<Item = B>) -> B {
    bags.into_iter().fold(B::default(), |mut merged, bag| {
        merged.absorb(bag);
        merged
    })
}
