/// 流程相关的常量定义
///
/// 各领域的系统指令、错误标签与上下文标题

/// 错误消息中的领域标签（`Error in <label>: ...`）
pub mod labels {
    pub const PROJECT: &str = "project management";
    pub const RESOURCE: &str = "resource management";
    pub const PROPOSAL: &str = "project deployment";
    pub const CLUSTER: &str = "cluster deployment";
    pub const DEVBOX: &str = "devbox deployment";
    pub const LAUNCHPAD: &str = "launchpad deployment";
}

/// 领域系统指令
pub mod prompt {
    pub const PROJECT: &str = "You are a project management assistant for Sealos. \
        You help users manage their projects by creating, updating, and deleting resources. \
        Always provide clear and helpful responses about project operations.";

    pub const RESOURCE: &str = "You are a resource management assistant for Sealos. \
        You help users manage individual resources like DevBoxes, Clusters, and Launchpads. \
        Always provide clear and helpful responses about resource operations.";

    pub const RESOURCE_EMPHASIS: &str = "IMPORTANT: The next message contains the newest resource context. \
        Pay close attention to it as it reflects the current state of the resource, \
        including any recent modifications like added ports, changed environment variables, \
        or updated configurations. Always use this latest context when answering questions or making decisions.";

    pub const PROPOSAL: &str = "You are a project deployment assistant for Sealos. \
        You help users deploy projects by creating the necessary infrastructure and applications. \
        Always provide clear and helpful responses about deployment operations.";

    pub const CLUSTER: &str = "You are a cluster deployment assistant for Sealos. \
        You help users deploy clusters by creating the necessary infrastructure and applications. \
        Always provide clear and helpful responses about deployment operations.";

    pub const DEVBOX: &str = "You are a devbox deployment assistant for Sealos. \
        You help users deploy devboxs by creating the necessary infrastructure and applications. \
        Always provide clear and helpful responses about deployment operations.";

    pub const LAUNCHPAD: &str = "You are a launchpad deployment assistant for Sealos. \
        You help users deploy launchpads by creating the necessary infrastructure and applications. \
        Always provide clear and helpful responses about deployment operations.";
}

/// 上下文快照的标题
pub mod headings {
    pub const PROJECT: &str = "Project Context";
    pub const RESOURCE: &str = "Resource Context";
    pub const CLUSTER: &str = "Cluster Context";
    pub const DEVBOX: &str = "Devbox Context";
    pub const LAUNCHPAD: &str = "Launchpad Context";
}

pub const TURN_LIMIT_REACHED: &str = "Turn limit reached";
