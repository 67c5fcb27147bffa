pub mod functions;
pub mod handlers;
pub mod structures;

pub use handlers::{
    __path_conversation_messages, __path_create_conversation, __path_create_test_conversation,
    __path_find_conversation, __path_generate_sms, __path_list_conversations, __path_mark_seen,
    __path_send_sms, __path_sms_callback, __path_unseen_count, __path_update_agent_activation,
    __path_update_conversation, conversation_messages, create_conversation,
    create_test_conversation, find_conversation, generate_sms, init_routes, list_conversations,
    mark_seen, send_sms, sms_callback, unseen_count, update_agent_activation, update_conversation,
};

pub use structures::{
    AgentActivationDto, ConversationListQuery, ConversationLookup, ConversationView,
    CreateConversationDto, CreateTestConversationDto, GenerateSmsDto, MarkSeenDto, SendSmsDto,
    SentSms, SmsCallbackEcho, SmsCallbackQuery, UnseenCount, UpdateConversationDto,
};
