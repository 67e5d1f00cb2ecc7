use crate::error::{Error, Result};
use crate::provider::{ContentProvider, ProviderResponse};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error};

/// 保留的事件名称
///
/// 插件自己的事件使用`<namespace>:<action>`格式，如`markdown:pre_render`。
pub mod names {
    /// 文章不存在。载荷：`slug`；处理器可设置`response`覆盖404
    pub const POST_NOT_FOUND: &str = "post_not_found";
    /// 文章指定的provider未注册。载荷：`slug`、`provider`；
    /// 处理器可设置`response`，或设置`provider`进行动态替换
    pub const PROVIDER_NOT_FOUND: &str = "provider_not_found";
    /// 当前会话是否为管理员。载荷：`session`；处理器写入`is_admin`
    pub const SESSION_IS_ADMIN: &str = "session_is_admin";

    pub const CORE_LOADED: &str = "core:loaded";
    /// 载荷：`slug`，处理器可改写
    pub const CORE_GET_POST: &str = "core:get_post";
    /// 载荷：`tag`，处理器可改写
    pub const CORE_GET_POSTS: &str = "core:get_posts";
    pub const CORE_SAVE_POST: &str = "core:save_post";
    pub const CORE_SAVE_POST_TAGS: &str = "core:save_post_tags";
    pub const CORE_SAVE_POST_META: &str = "core:save_post_meta";
    pub const CORE_CHANGE_POST_SLUG: &str = "core:change_post_slug";
    pub const CORE_DELETE_POST: &str = "core:delete_post";

    /// 以此开头的事件名会被改写为主provider的命名空间
    pub const MAIN_PREFIX: &str = "main:";
}

/// 事件处理器返回的错误
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// 事件处理器：接收载荷，返回（可能已修改的）载荷
pub type EventHandler = Arc<dyn Fn(EventPayload) -> std::result::Result<EventPayload, HandlerError> + Send + Sync>;

/// 事件载荷
///
/// `data`为通用键值，各事件约定的键见[`names`]。
/// 短路（`stop`）和覆盖（`response`、`provider`）使用显式字段。
#[derive(Clone, Default)]
pub struct EventPayload {
    data: Map<String, Value>,
    stop: bool,
    response: Option<ProviderResponse>,
    provider: Option<Arc<dyn ContentProvider>>,
}

impl EventPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// 构造时附带一个键值
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.data.get(key).and_then(Value::as_bool)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    /// 请求在当前处理器之后终止处理链
    pub fn stop(&mut self) {
        self.stop = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stop
    }

    pub fn set_response(&mut self, response: ProviderResponse) {
        self.response = Some(response);
    }

    pub fn response(&self) -> Option<&ProviderResponse> {
        self.response.as_ref()
    }

    pub fn take_response(&mut self) -> Option<ProviderResponse> {
        self.response.take()
    }

    pub fn set_provider(&mut self, provider: Arc<dyn ContentProvider>) {
        self.provider = Some(provider);
    }

    pub fn take_provider(&mut self) -> Option<Arc<dyn ContentProvider>> {
        self.provider.take()
    }
}

impl fmt::Debug for EventPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventPayload")
            .field("data", &self.data)
            .field("stop", &self.stop)
            .field("response", &self.response)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn ContentProvider>"))
            .finish()
    }
}

/// 事件总线
///
/// 事件名到有序处理器列表的映射。处理器按注册顺序执行，不重排、不去重。
/// 注册只能在启动阶段通过`&mut`完成，之后总线随[`crate::Site`]冻结，
/// 请求处理期间只读，因此无需加锁。
#[derive(Clone, Default)]
pub struct EventBus {
    registry: HashMap<String, Vec<EventHandler>>,
    main_alias: Option<String>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加处理器到事件的处理链末尾
    pub fn register<F>(&mut self, event: impl Into<String>, handler: F)
    where
        F: Fn(EventPayload) -> std::result::Result<EventPayload, HandlerError> + Send + Sync + 'static,
    {
        let event = event.into();
        debug!("Registering handler for event {}", event);
        self.registry.entry(event).or_default().push(Arc::new(handler));
    }

    /// 设置`main:`前缀的改写目标
    pub fn set_main_alias(&mut self, main: impl Into<String>) {
        self.main_alias = Some(main.into());
    }

    pub fn handler_count(&self, event: &str) -> usize {
        self.registry.get(&self.resolve_name(event)).map_or(0, Vec::len)
    }

    fn resolve_name(&self, event: &str) -> String {
        match (event.strip_prefix(names::MAIN_PREFIX), &self.main_alias) {
            (Some(action), Some(main)) => format!("{}:{}", main, action),
            _ => event.to_string(),
        }
    }

    /// 依次执行事件的处理器
    ///
    /// 每个处理器接收上一个处理器返回的载荷。处理器设置`stop`后，
    /// 清除该标记并立即返回当前载荷。没有处理器时原样返回输入。
    /// 处理器返回错误视为编程错误，以`InvalidHandlerResult`中止。
    pub fn invoke(&self, event: &str, payload: EventPayload) -> Result<EventPayload> {
        let name = self.resolve_name(event);
        let Some(handlers) = self.registry.get(&name) else {
            return Ok(payload);
        };

        let mut payload = payload;
        for (index, handler) in handlers.iter().enumerate() {
            payload = handler(payload).map_err(|e| {
                error!("Event handler #{} of {} failed: {}", index, name, e);
                Error::InvalidHandlerResult {
                    event: name.clone(),
                    index,
                    reason: e.to_string(),
                }
            })?;
            if std::mem::take(&mut payload.stop) {
                debug!("Event {} stopped by handler #{}", name, index);
                break;
            }
        }
        Ok(payload)
    }

    /// 以空载荷触发事件
    pub fn emit(&self, event: &str) -> Result<EventPayload> {
        self.invoke(event, EventPayload::new())
    }
}
