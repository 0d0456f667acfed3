use crate::app::View;

/// 应用命令枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    // ===== 退出 / 会话 =====
    Quit,
    /// 确认后退出登录
    Logout,

    // ===== 视图 =====
    SwitchView(View),
    NextView,
    ShowHelp,

    // ===== 导航 =====
    /// 选择上一项（任务、行、子任务）
    SelectUp,
    /// 选择下一项
    SelectDown,
    /// 切换到左边的列
    ColumnLeft,
    /// 切换到右边的列
    ColumnRight,

    // ===== 看板移动 =====
    /// 将任务移到左边的列
    MoveTaskLeft,
    /// 将任务移到右边的列
    MoveTaskRight,
    /// 任务在当前列中上移
    MoveTaskUp,
    /// 任务在当前列中下移
    MoveTaskDown,

    // ===== 增删改（按当前视图解释）=====
    NewItem,
    EditItem,
    DeleteItem,
    /// Enter：打开详情、按状态筛选或打开项目
    Open,
    /// 复制任务到剪贴板
    CopyTask,

    // ===== 任务表筛选 =====
    Search,
    FilterDepartment,
    FilterStatus,
    FilterPriority,
    FilterMonth,
    FilterYear,
    ChooseSort,
    ReverseSort,
    ClearFilters,

    // ===== 用户 =====
    SetPassword,

    // ===== 详情 =====
    /// 子任务状态前进一步
    CycleSubtaskStatus,
    /// 关闭详情/帮助
    Close,
}
