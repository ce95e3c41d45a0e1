//! 纯金属批次仓储接口

use async_trait::async_trait;
use aurum_errors::AppResult;

use crate::domain::entities::PureMetalLot;

/// 纯金属批次仓储接口
#[async_trait]
pub trait PureMetalLotRepository: Send + Sync {
    /// 保存批次（入库）
    async fn save(&self, lot: &PureMetalLot) -> AppResult<()>;
}
